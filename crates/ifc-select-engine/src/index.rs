// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element index construction
//!
//! [`IndexBuilder`] turns a raw entity graph plus optional extraction maps
//! into an immutable [`ElementIndex`]: one denormalized record per
//! product/spatial entity, plus secondary lookups by type, storey,
//! classification and material. Every join is a map lookup keyed by raw
//! id, so build cost is linear in entity and relationship count. Missing
//! extraction inputs degrade to empty record fields.

use ifc_select_model::{
    ClassificationRef, Element, ElementId, MaterialInfo, PropertyValue, RawEntity,
    RelationshipRefs, Result, SelectError, SpatialLevel, SpatialPlacement, TypeCategory,
    TypeHierarchy,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// One extracted property set assigned to an element
#[derive(Clone, Debug)]
pub struct PropertySetData {
    /// Property set name (the namespace)
    pub name: String,
    /// Property name/value pairs
    pub properties: Vec<(String, PropertyValue)>,
}

/// One extracted quantity set assigned to an element
#[derive(Clone, Debug)]
pub struct QuantitySetData {
    /// Quantity set name (the namespace)
    pub name: String,
    /// Quantity name/value pairs
    pub quantities: Vec<(String, f64)>,
}

/// A node of the extracted spatial hierarchy
#[derive(Clone, Debug)]
pub struct SpatialNodeInfo {
    /// Containment level of this node
    pub level: SpatialLevel,
    /// Node name
    pub name: Option<String>,
    /// Elevation (storeys)
    pub elevation: Option<f64>,
}

/// Extracted spatial containment tables
///
/// `containment` maps an element to its immediate spatial container;
/// `parents` maps a container to the next container up. Both are plain
/// id lookups, never traversed beyond the five containment levels.
#[derive(Clone, Debug, Default)]
pub struct SpatialTable {
    pub nodes: FxHashMap<u32, SpatialNodeInfo>,
    pub containment: FxHashMap<u32, u32>,
    pub parents: FxHashMap<u32, u32>,
}

/// Raw graph snapshot consumed by the index builder
///
/// Only `entities` is required; every extraction map may be omitted,
/// yielding a degraded but valid index.
#[derive(Clone, Debug, Default)]
pub struct ModelGraph {
    /// Decoded entities (required)
    pub entities: Vec<RawEntity>,
    /// Property set assignments by raw id
    pub property_sets: FxHashMap<u32, Vec<PropertySetData>>,
    /// Quantity set assignments by raw id
    pub quantity_sets: FxHashMap<u32, Vec<QuantitySetData>>,
    /// Material associations by raw id
    pub materials: FxHashMap<u32, MaterialInfo>,
    /// Classification references by raw id
    pub classifications: FxHashMap<u32, Vec<ClassificationRef>>,
    /// Spatial containment tables
    pub spatial: Option<SpatialTable>,
    /// Relationship references by raw id
    pub relationships: FxHashMap<u32, RelationshipRefs>,
}

impl ModelGraph {
    /// Create a graph from entities alone
    pub fn new(entities: Vec<RawEntity>) -> Self {
        Self {
            entities,
            ..Default::default()
        }
    }
}

/// The element index: all records plus secondary lookups
///
/// Built once from a graph snapshot and read-only afterwards. Rebuilding
/// means discarding and reconstructing wholesale.
#[derive(Debug, Default)]
pub struct ElementIndex {
    elements: Vec<Element>,
    by_id: FxHashMap<u32, usize>,
    by_type: FxHashMap<String, Vec<ElementId>>,
    by_storey: FxHashMap<String, Vec<ElementId>>,
    by_classification: FxHashMap<String, Vec<ElementId>>,
    by_material: FxHashMap<String, Vec<ElementId>>,
    property_set_names: FxHashSet<String>,
    quantity_set_names: FxHashSet<String>,
    classification_systems: FxHashSet<String>,
}

impl ElementIndex {
    /// Number of indexed elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get a record by id
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.by_id.get(&id.0).map(|&i| &self.elements[i])
    }

    /// All records in build order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Ids of elements with this exact type name
    pub fn ids_by_type(&self, type_name: &str) -> &[ElementId] {
        self.by_type
            .get(&type_name.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ids of elements contained in a storey (by storey name)
    pub fn ids_by_storey(&self, storey_name: &str) -> &[ElementId] {
        self.by_storey
            .get(storey_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ids of elements carrying a classification key (`system:code`)
    pub fn ids_by_classification(&self, key: &str) -> &[ElementId] {
        self.by_classification
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ids of elements with a material of this name
    pub fn ids_by_material(&self, material_name: &str) -> &[ElementId] {
        self.by_material
            .get(material_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Distinct property-set namespaces observed while building
    pub fn property_set_names(&self) -> &FxHashSet<String> {
        &self.property_set_names
    }

    /// Distinct quantity-set namespaces observed while building
    pub fn quantity_set_names(&self) -> &FxHashSet<String> {
        &self.quantity_set_names
    }

    /// Distinct classification systems observed while building
    pub fn classification_systems(&self) -> &FxHashSet<String> {
        &self.classification_systems
    }
}

/// Builds an [`ElementIndex`] from a [`ModelGraph`]
///
/// The type-ancestry table is injected at construction; [`Default`] uses
/// the standard IFC table.
pub struct IndexBuilder {
    hierarchy: TypeHierarchy,
}

impl IndexBuilder {
    /// Create a builder with an explicit type table
    pub fn new(hierarchy: TypeHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Build the index
    ///
    /// Fails only when the graph carries no entities at all; every other
    /// degradation (missing extraction maps, unknown types) is silent or
    /// logged at debug level.
    pub fn build(&self, graph: &ModelGraph) -> Result<ElementIndex> {
        if graph.entities.is_empty() {
            return Err(SelectError::MissingEntities);
        }

        let mut index = ElementIndex::default();

        for entity in &graph.entities {
            if !self.hierarchy.is_indexable(&entity.type_name) {
                continue;
            }
            if index.by_id.contains_key(&entity.id.0) {
                debug!(id = %entity.id, "duplicate entity id skipped");
                continue;
            }

            let element = self.build_element(entity, graph);
            self.index_secondary(&mut index, &element);
            index.by_id.insert(element.id.0, index.elements.len());
            index.elements.push(element);
        }

        Ok(index)
    }

    /// Category of an entity type, for callers that pre-filter
    pub fn category(&self, type_name: &str) -> Option<TypeCategory> {
        self.hierarchy.category(type_name)
    }

    fn build_element(&self, entity: &RawEntity, graph: &ModelGraph) -> Element {
        let raw_id = entity.id.0;
        // Table lookups are case-insensitive, so the chain may end with the
        // table's canonical spelling. It must end with the entity's own.
        let mut type_ancestry = self.hierarchy.ancestry_or_self(&entity.type_name);
        if let Some(last) = type_ancestry.last_mut() {
            *last = entity.type_name.clone();
        }
        let mut element = Element {
            id: entity.id,
            global_id: entity.global_id().unwrap_or_default().to_string(),
            type_name: entity.type_name.clone(),
            type_ancestry,
            name: entity.name().map(str::to_string),
            description: entity.description().map(str::to_string),
            object_type: entity.object_type().map(str::to_string),
            tag: entity.tag().map(str::to_string),
            predefined_type: entity.predefined_type().map(str::to_string),
            ..Default::default()
        };

        if let Some(sets) = graph.property_sets.get(&raw_id) {
            for set in sets {
                let ns = element.properties.entry(set.name.clone()).or_default();
                for (name, value) in &set.properties {
                    ns.insert(name.clone(), value.clone());
                }
            }
        }

        if let Some(sets) = graph.quantity_sets.get(&raw_id) {
            for set in sets {
                let ns = element.quantities.entry(set.name.clone()).or_default();
                for (name, value) in &set.quantities {
                    ns.insert(name.clone(), *value);
                }
            }
        }

        element.material = graph.materials.get(&raw_id).cloned();
        element.classifications = graph
            .classifications
            .get(&raw_id)
            .cloned()
            .unwrap_or_default();
        element.relationships = graph.relationships.get(&raw_id).cloned();
        element.spatial = graph
            .spatial
            .as_ref()
            .and_then(|table| resolve_placement(table, raw_id));

        element
    }

    fn index_secondary(&self, index: &mut ElementIndex, element: &Element) {
        index
            .by_type
            .entry(element.type_name.to_uppercase())
            .or_default()
            .push(element.id);

        if let Some(storey) = element.spatial.as_ref().and_then(|s| s.storey.clone()) {
            index.by_storey.entry(storey).or_default().push(element.id);
        }

        for class_ref in &element.classifications {
            index
                .by_classification
                .entry(class_ref.key())
                .or_default()
                .push(element.id);
            index
                .classification_systems
                .insert(class_ref.system.clone());
        }

        if let Some(material) = &element.material {
            index
                .by_material
                .entry(material.name.clone())
                .or_default()
                .push(element.id);
        }

        for ns in element.properties.keys() {
            index.property_set_names.insert(ns.clone());
        }
        for ns in element.quantities.keys() {
            index.quantity_set_names.insert(ns.clone());
        }
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new(TypeHierarchy::standard())
    }
}

/// Resolve an element's containment chain into level names
///
/// Walks `containment` once, then `parents` upward, filling each level the
/// first time it is seen. The walk is capped at the five containment
/// levels to stay robust against cyclic input.
fn resolve_placement(table: &SpatialTable, element_id: u32) -> Option<SpatialPlacement> {
    let mut placement = SpatialPlacement::default();
    let mut current = *table.containment.get(&element_id)?;
    let mut filled_any = false;

    for _ in 0..6 {
        if let Some(node) = table.nodes.get(&current) {
            filled_any = true;
            let name = node.name.clone();
            match node.level {
                SpatialLevel::Space => placement.space = placement.space.take().or(name),
                SpatialLevel::Storey => {
                    if placement.storey.is_none() {
                        placement.storey = name;
                        placement.storey_elevation = node.elevation;
                    }
                }
                SpatialLevel::Building => placement.building = placement.building.take().or(name),
                SpatialLevel::Site => placement.site = placement.site.take().or(name),
                SpatialLevel::Project => placement.project = placement.project.take().or(name),
            }
        }
        match table.parents.get(&current) {
            Some(&parent) if parent != current => current = parent,
            _ => break,
        }
    }

    filled_any.then_some(placement)
}
