// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type-ancestry table
//!
//! An immutable lookup from entity type name to its ancestry chain, used
//! both to filter the raw graph down to product/spatial kinds and for
//! subtype-aware ("is-a") matching. The table is injected into the index
//! builder; [`TypeHierarchy::standard`] covers the common IFC classes.
//! Unknown types fall back to a single-element chain.

use rustc_hash::FxHashMap;

/// Broad category of an indexable type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeCategory {
    /// Physical products (walls, slabs, doors, ...)
    Product,
    /// Spatial structure (project, site, building, storey, space)
    Spatial,
}

#[derive(Clone, Debug)]
struct TypeEntry {
    category: TypeCategory,
    /// Most general first, own name last
    chain: Vec<String>,
}

/// Immutable type-ancestry lookup
#[derive(Clone, Debug)]
pub struct TypeHierarchy {
    table: FxHashMap<String, TypeEntry>,
}

/// Standard table rows: (name, category, ancestors before the name itself)
const STANDARD: &[(&str, TypeCategory, &[&str])] = &[
    // Spatial structure
    ("IfcProject", TypeCategory::Spatial, &[]),
    ("IfcSite", TypeCategory::Spatial, &["IfcProduct", "IfcSpatialStructureElement"]),
    ("IfcBuilding", TypeCategory::Spatial, &["IfcProduct", "IfcSpatialStructureElement"]),
    ("IfcBuildingStorey", TypeCategory::Spatial, &["IfcProduct", "IfcSpatialStructureElement"]),
    ("IfcSpace", TypeCategory::Spatial, &["IfcProduct", "IfcSpatialStructureElement"]),
    // Building elements
    ("IfcWall", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcWallStandardCase", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement", "IfcWall"]),
    ("IfcCurtainWall", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcSlab", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcRoof", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcBeam", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcColumn", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcDoor", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcWindow", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcStair", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcStairFlight", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcRamp", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcRampFlight", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcRailing", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcCovering", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcPlate", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcMember", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcFooting", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcPile", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcChimney", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcShadingDevice", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    ("IfcBuildingElementProxy", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcBuildingElement"]),
    // Furnishing
    ("IfcFurnishingElement", TypeCategory::Product, &["IfcProduct", "IfcElement"]),
    ("IfcFurniture", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcFurnishingElement"]),
    ("IfcSystemFurnitureElement", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcFurnishingElement"]),
    // Distribution (MEP)
    ("IfcDistributionElement", TypeCategory::Product, &["IfcProduct", "IfcElement"]),
    ("IfcDistributionFlowElement", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement"]),
    ("IfcFlowTerminal", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement", "IfcDistributionFlowElement"]),
    ("IfcFlowSegment", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement", "IfcDistributionFlowElement"]),
    ("IfcFlowFitting", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement", "IfcDistributionFlowElement"]),
    ("IfcFlowController", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement", "IfcDistributionFlowElement"]),
    ("IfcFlowMovingDevice", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement", "IfcDistributionFlowElement"]),
    ("IfcFlowStorageDevice", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement", "IfcDistributionFlowElement"]),
    ("IfcFlowTreatmentDevice", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement", "IfcDistributionFlowElement"]),
    ("IfcEnergyConversionDevice", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement", "IfcDistributionFlowElement"]),
    ("IfcDistributionControlElement", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcDistributionElement"]),
    // Openings and features
    ("IfcOpeningElement", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcFeatureElement"]),
    ("IfcOpeningStandardCase", TypeCategory::Product, &["IfcProduct", "IfcElement", "IfcFeatureElement", "IfcOpeningElement"]),
    // Infrastructure (IFC4x3)
    ("IfcFacility", TypeCategory::Spatial, &["IfcProduct", "IfcSpatialStructureElement"]),
    ("IfcFacilityPart", TypeCategory::Spatial, &["IfcProduct", "IfcSpatialStructureElement", "IfcFacility"]),
    ("IfcRoad", TypeCategory::Spatial, &["IfcProduct", "IfcSpatialStructureElement", "IfcFacility"]),
    ("IfcBridge", TypeCategory::Spatial, &["IfcProduct", "IfcSpatialStructureElement", "IfcFacility"]),
    ("IfcRailway", TypeCategory::Spatial, &["IfcProduct", "IfcSpatialStructureElement", "IfcFacility"]),
];

impl TypeHierarchy {
    /// Build a hierarchy from explicit rows
    pub fn new(rows: impl IntoIterator<Item = (String, TypeCategory, Vec<String>)>) -> Self {
        let mut table = FxHashMap::default();
        for (name, category, ancestors) in rows {
            let mut chain = ancestors;
            chain.push(name.clone());
            table.insert(name.to_uppercase(), TypeEntry { category, chain });
        }
        Self { table }
    }

    /// The standard IFC product/spatial table
    pub fn standard() -> Self {
        Self::new(STANDARD.iter().map(|(name, category, ancestors)| {
            (
                name.to_string(),
                *category,
                ancestors.iter().map(|a| a.to_string()).collect(),
            )
        }))
    }

    /// Ancestry chain for a known type, most general first
    pub fn ancestry(&self, type_name: &str) -> Option<&[String]> {
        self.table
            .get(&type_name.to_uppercase())
            .map(|e| e.chain.as_slice())
    }

    /// Ancestry chain with single-element fallback for unknown types
    pub fn ancestry_or_self(&self, type_name: &str) -> Vec<String> {
        match self.ancestry(type_name) {
            Some(chain) => chain.to_vec(),
            None => vec![type_name.to_string()],
        }
    }

    /// Category of a known type
    pub fn category(&self, type_name: &str) -> Option<TypeCategory> {
        self.table
            .get(&type_name.to_uppercase())
            .map(|e| e.category)
    }

    /// Whether entities of this type belong in the element index
    ///
    /// Pure relationship/definition records and geometry resources are not
    /// in the table, so they are excluded here.
    pub fn is_indexable(&self, type_name: &str) -> bool {
        self.category(type_name).is_some()
    }

    /// Whether `candidate` appears in the ancestry chain of `type_name`
    pub fn is_ancestor(&self, candidate: &str, type_name: &str) -> bool {
        self.ancestry(type_name)
            .map(|chain| chain.iter().any(|t| t.eq_ignore_ascii_case(candidate)))
            .unwrap_or_else(|| candidate.eq_ignore_ascii_case(type_name))
    }

    /// Number of known types
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ends_with_own_name() {
        let h = TypeHierarchy::standard();
        let chain = h.ancestry("IFCWALLSTANDARDCASE").unwrap();
        assert_eq!(chain.last().map(String::as_str), Some("IfcWallStandardCase"));
        assert!(chain.iter().any(|t| t == "IfcWall"));
    }

    #[test]
    fn unknown_type_falls_back_to_self() {
        let h = TypeHierarchy::standard();
        assert!(h.ancestry("IfcSpaceElephant").is_none());
        assert_eq!(h.ancestry_or_self("IfcSpaceElephant"), vec!["IfcSpaceElephant"]);
    }

    #[test]
    fn relationship_records_are_not_indexable() {
        let h = TypeHierarchy::standard();
        assert!(h.is_indexable("ifcwall"));
        assert!(h.is_indexable("IfcBuildingStorey"));
        assert!(!h.is_indexable("IfcRelAggregates"));
        assert!(!h.is_indexable("IfcPropertySet"));
    }

    #[test]
    fn is_ancestor_matching() {
        let h = TypeHierarchy::standard();
        assert!(h.is_ancestor("IfcWall", "IfcWallStandardCase"));
        assert!(h.is_ancestor("IFCDISTRIBUTIONELEMENT", "IfcFlowTerminal"));
        assert!(!h.is_ancestor("IfcWall", "IfcSlab"));
        // unknown subject: only an exact name counts
        assert!(h.is_ancestor("Widget", "Widget"));
        assert!(!h.is_ancestor("IfcWall", "Widget"));
    }
}
