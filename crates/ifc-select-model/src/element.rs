// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The unified element record
//!
//! One record per source entity of interest: a denormalized view of the
//! entity plus its joined properties, quantities, material, classifications
//! and spatial placement. Records are built once per loaded model and never
//! mutated afterwards.

use crate::rule::{AttributeField, SpatialLevel};
use crate::value::PropertyValue;
use crate::ElementId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Resolved spatial containment names for one element
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialPlacement {
    /// Containing project name
    pub project: Option<String>,
    /// Containing site name
    pub site: Option<String>,
    /// Containing building name
    pub building: Option<String>,
    /// Containing storey name
    pub storey: Option<String>,
    /// Containing space name
    pub space: Option<String>,
    /// Elevation of the containing storey
    pub storey_elevation: Option<f64>,
}

impl SpatialPlacement {
    /// Get the name at a containment level
    pub fn name_at(&self, level: SpatialLevel) -> Option<&str> {
        match level {
            SpatialLevel::Project => self.project.as_deref(),
            SpatialLevel::Site => self.site.as_deref(),
            SpatialLevel::Building => self.building.as_deref(),
            SpatialLevel::Storey => self.storey.as_deref(),
            SpatialLevel::Space => self.space.as_deref(),
        }
    }
}

/// One layer of a layered material
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialLayer {
    /// Layer material name
    pub name: String,
    /// Layer thickness
    pub thickness: f64,
}

/// Material kind as associated in the source model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialKind {
    /// Single IfcMaterial
    Single,
    /// IfcMaterialLayerSet / usage
    LayerSet,
    /// IfcMaterialList
    List,
    /// IfcMaterialConstituentSet
    ConstituentSet,
}

/// Material descriptor joined onto an element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialInfo {
    /// Primary material name
    pub name: String,
    /// How the material was associated
    pub kind: MaterialKind,
    /// Layers, for layered materials
    pub layers: Vec<MaterialLayer>,
    /// Aggregate thickness across layers
    pub total_thickness: Option<f64>,
}

impl MaterialInfo {
    /// Create a single (non-layered) material
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Single,
            layers: Vec::new(),
            total_thickness: None,
        }
    }

    /// Create a layered material; total thickness is the layer sum
    pub fn layered(name: impl Into<String>, layers: Vec<MaterialLayer>) -> Self {
        let total: f64 = layers.iter().map(|l| l.thickness).sum();
        Self {
            name: name.into(),
            kind: MaterialKind::LayerSet,
            layers,
            total_thickness: Some(total),
        }
    }
}

/// One classification reference on an element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRef {
    /// Classification system name (e.g., "Uniclass 2015")
    pub system: String,
    /// Reference code (e.g., "EF_25_10")
    pub code: String,
    /// Reference name
    pub name: Option<String>,
    /// Hierarchy path from root to this reference
    pub path: Vec<String>,
}

impl ClassificationRef {
    /// Secondary-index key (`system:code`)
    pub fn key(&self) -> String {
        format!("{}:{}", self.system, self.code)
    }
}

/// References to related element ids
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRefs {
    /// Spatial container (IfcRelContainedInSpatialStructure)
    pub contained_in: Option<ElementId>,
    /// Aggregating parent (IfcRelAggregates)
    pub aggregated_by: Option<ElementId>,
    /// Connected elements (IfcRelConnectsPathElements)
    pub connected_to: Vec<ElementId>,
    /// Defining type object (IfcRelDefinesByType)
    pub defined_by_type: Option<ElementId>,
}

/// Namespace map: property set name -> property name -> value
pub type PropertyMap = FxHashMap<String, FxHashMap<String, PropertyValue>>;

/// Namespace map: quantity set name -> quantity name -> number
pub type QuantityMap = FxHashMap<String, FxHashMap<String, f64>>;

/// The unified element record
///
/// Identity, type ancestry, string attributes, spatial placement and the
/// joined property/quantity/material/classification data for one entity.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Element {
    /// Express ID, unique within one index
    pub id: ElementId,
    /// GlobalId carried through for external correlation; never matched on
    pub global_id: String,
    /// Entity type name as seen in the source (e.g., "IfcWall")
    pub type_name: String,
    /// Type names from most general to most specific; ends with `type_name`
    pub type_ancestry: Vec<String>,
    /// Name attribute
    pub name: Option<String>,
    /// Description attribute
    pub description: Option<String>,
    /// Tag attribute
    pub tag: Option<String>,
    /// ObjectType attribute
    pub object_type: Option<String>,
    /// PredefinedType enumeration
    pub predefined_type: Option<String>,
    /// Spatial containment, when a spatial table was supplied
    pub spatial: Option<SpatialPlacement>,
    /// Property sets: namespace -> name -> typed value
    pub properties: PropertyMap,
    /// Quantity sets: namespace -> name -> number
    pub quantities: QuantityMap,
    /// Associated material
    pub material: Option<MaterialInfo>,
    /// Classification references
    pub classifications: Vec<ClassificationRef>,
    /// Relationship references
    pub relationships: Option<RelationshipRefs>,
}

impl Element {
    /// Look up a property in an exact namespace
    pub fn property(&self, namespace: &str, name: &str) -> Option<&PropertyValue> {
        self.properties.get(namespace).and_then(|set| set.get(name))
    }

    /// Look up a property by name across all namespaces
    ///
    /// When the same name exists in several namespaces, which one wins
    /// follows map iteration order and is unspecified.
    pub fn find_property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.values().find_map(|set| set.get(name))
    }

    /// Look up a quantity in an exact namespace
    pub fn quantity(&self, namespace: &str, name: &str) -> Option<f64> {
        self.quantities
            .get(namespace)
            .and_then(|set| set.get(name))
            .copied()
    }

    /// Look up a quantity by name across all namespaces
    pub fn find_quantity(&self, name: &str) -> Option<f64> {
        self.quantities
            .values()
            .find_map(|set| set.get(name))
            .copied()
    }

    /// Get a string attribute by field
    pub fn attribute(&self, field: AttributeField) -> Option<&str> {
        match field {
            AttributeField::Name => self.name.as_deref(),
            AttributeField::Description => self.description.as_deref(),
            AttributeField::Tag => self.tag.as_deref(),
            AttributeField::ObjectType => self.object_type.as_deref(),
            AttributeField::PredefinedType => self.predefined_type.as_deref(),
        }
    }

    /// Check whether a type name appears in the ancestry chain
    pub fn has_ancestor(&self, type_name: &str) -> bool {
        self.type_ancestry
            .iter()
            .any(|t| t.eq_ignore_ascii_case(type_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        let mut properties: PropertyMap = FxHashMap::default();
        let mut pset = FxHashMap::default();
        pset.insert("IsExternal".to_string(), PropertyValue::Boolean(true));
        properties.insert("Pset_WallCommon".to_string(), pset);

        Element {
            id: ElementId(1),
            type_name: "IfcWallStandardCase".into(),
            type_ancestry: vec![
                "IfcElement".into(),
                "IfcWall".into(),
                "IfcWallStandardCase".into(),
            ],
            name: Some("Wall 1".into()),
            properties,
            ..Default::default()
        }
    }

    #[test]
    fn property_lookup() {
        let e = sample();
        assert_eq!(
            e.property("Pset_WallCommon", "IsExternal"),
            Some(&PropertyValue::Boolean(true))
        );
        assert!(e.property("Pset_Other", "IsExternal").is_none());
        assert_eq!(
            e.find_property("IsExternal"),
            Some(&PropertyValue::Boolean(true))
        );
    }

    #[test]
    fn ancestry_check_ignores_case() {
        let e = sample();
        assert!(e.has_ancestor("IFCWALL"));
        assert!(!e.has_ancestor("IfcSlab"));
    }

    #[test]
    fn material_layer_sum() {
        let m = MaterialInfo::layered(
            "Concrete/Insulation",
            vec![
                MaterialLayer {
                    name: "Concrete".into(),
                    thickness: 0.2,
                },
                MaterialLayer {
                    name: "Insulation".into(),
                    thickness: 0.1,
                },
            ],
        );
        assert!((m.total_thickness.unwrap() - 0.3).abs() < 1e-9);
    }
}
