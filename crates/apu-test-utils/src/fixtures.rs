//! Domain fixtures.
//!
//! Line builders return rows with a persisted id and every field needed to
//! pass validation; partial costs are left at zero for the recompute pass.

use apu_core::{MemoryStore, StoreDocument, recompute};
use apu_model::{
    ApuParams, CatalogResource, CostType, LineItemRef, PersistedApu, ResourceLine, ResourceType,
    RowId,
};

/// Line item `li-1` of project `p-1`, budget `b-1`
pub fn line_item() -> LineItemRef {
    LineItemRef::new("li-1", "p-1", "b-1")
}

fn line(id: &str, resource_type: ResourceType, unit: &str, price: f64) -> ResourceLine {
    let mut line = ResourceLine::blank(RowId::persisted(id), 0);
    line.resource_ref = Some(format!("res-{}", id));
    line.code = format!("{}-{}", resource_type.abbreviation(), id);
    line.description = format!("{} {}", resource_type, id);
    line.resource_type = resource_type;
    line.unit = unit.to_string();
    line.unit_price = price;
    line
}

pub fn material(id: &str, quantity: f64, price: f64) -> ResourceLine {
    let mut line = line(id, ResourceType::Material, "m3", price);
    line.quantity = quantity;
    line
}

/// Labor in man-hours with quantity derived from `crew` under `params`
pub fn labor_hh(id: &str, crew: f64, price: f64, params: &ApuParams) -> ResourceLine {
    let mut line = line(id, ResourceType::Labor, "hh", price);
    line.crew_size = Some(crew);
    line.quantity = apu_core::sync::quantity_from_crew(crew, params);
    line
}

/// Equipment priced as `percent` of labor
pub fn equipment_percent(id: &str, percent: f64) -> ResourceLine {
    let mut line = line(id, ResourceType::Equipment, "%mo", 0.0);
    line.quantity = percent;
    line
}

pub fn catalog_resource(id: &str, code: &str, unit: &str, price: f64) -> CatalogResource {
    CatalogResource {
        id: id.to_string(),
        name: format!("Resource {}", id),
        code: format!("{}-{}", code, id),
        unit: unit.to_string(),
        cost_type: CostType::coded(code),
        base_price: price,
    }
}

/// A persisted APU for [`line_item`], with orders and partial costs settled
pub fn persisted_apu(id: &str, params: ApuParams, lines: Vec<ResourceLine>) -> PersistedApu {
    let mut lines = recompute(&lines, &params);
    for (order, line) in lines.iter_mut().enumerate() {
        line.order = order;
    }
    PersistedApu {
        id: id.to_string(),
        line_item: line_item(),
        params,
        lines,
    }
}

/// Materials `a`, `b` and `c`, stored as APU `apu-1`
pub fn three_material_apu() -> PersistedApu {
    persisted_apu(
        "apu-1",
        ApuParams::default(),
        vec![
            material("a", 1.0, 10.0),
            material("b", 2.0, 20.0),
            material("c", 3.0, 30.0),
        ],
    )
}

/// A memory store holding `apus` and a small catalog
pub fn seeded_store(apus: Vec<PersistedApu>) -> MemoryStore {
    let mut doc = StoreDocument::new();
    doc.apus = apus;
    doc.catalog = vec![
        catalog_resource("cement", "MT", "bls", 25.0),
        catalog_resource("peon", "MO", "hh", 12.5),
        catalog_resource("tools", "EQ", "%mo", 0.0),
        catalog_resource("mixer", "EQ", "hm", 40.0),
    ];
    MemoryStore::with_document(doc)
}
