use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

use super::queries;
use crate::models::{ExtraWorkStatus, NewExtraWork, NewResource, Priority};

struct SeedExtraWork {
    code: &'static str,
    title: &'static str,
    description: &'static str,
    status: ExtraWorkStatus,
    priority: Priority,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
}

struct SeedResource {
    name: &'static str,
    resource_type: &'static str,
    url: Option<&'static str>,
    metadata: &'static str,
    /// Index into the work item list, `None` for unassigned stock.
    extrawork: Option<usize>,
}

const EXTRAWORKS: &[SeedExtraWork] = &[
    SeedExtraWork {
        code: "EW-001-FACHADA",
        title: "Renovación Fachada Edificio Principal",
        description: "Renovación completa de la fachada del edificio principal: pintura, reparación de grietas y mejoras estructurales.",
        status: ExtraWorkStatus::InProgress,
        priority: Priority::High,
        start: (2026, 1, 15),
        end: (2026, 3, 30),
    },
    SeedExtraWork {
        code: "EW-002-HVAC",
        title: "Instalación Sistema HVAC Adicional",
        description: "Sistema de climatización adicional en las nuevas áreas de expansión del edificio.",
        status: ExtraWorkStatus::Pending,
        priority: Priority::Medium,
        start: (2026, 2, 1),
        end: (2026, 4, 15),
    },
    SeedExtraWork {
        code: "EW-003-PARKING",
        title: "Ampliación Estacionamiento",
        description: "Construcción de 50 plazas adicionales de estacionamiento subterráneo con sistema de seguridad.",
        status: ExtraWorkStatus::Pending,
        priority: Priority::Low,
        start: (2026, 3, 1),
        end: (2026, 6, 30),
    },
    SeedExtraWork {
        code: "EW-004-RED",
        title: "Cableado de Red Estructurada",
        description: "Cableado de red estructurada categoría 6A en todos los pisos del edificio.",
        status: ExtraWorkStatus::Completed,
        priority: Priority::High,
        start: (2025, 11, 1),
        end: (2026, 1, 10),
    },
    SeedExtraWork {
        code: "EW-005-SOLAR",
        title: "Sistema de Paneles Solares",
        description: "Sistema fotovoltaico en la azotea para generación de energía renovable.",
        status: ExtraWorkStatus::OnHold,
        priority: Priority::Medium,
        start: (2026, 4, 1),
        end: (2026, 7, 31),
    },
    SeedExtraWork {
        code: "EW-006-ASCENSORES",
        title: "Modernización Ascensores",
        description: "Actualización del sistema de ascensores con controles inteligentes y eficiencia energética.",
        status: ExtraWorkStatus::InProgress,
        priority: Priority::Critical,
        start: (2026, 1, 20),
        end: (2026, 5, 15),
    },
];

const RESOURCES: &[SeedResource] = &[
    SeedResource {
        name: "Equipo de Albañilería",
        resource_type: "personnel",
        url: Some("https://example.com/team/albanileria"),
        metadata: r#"{"size":8,"contractor":"Constructora XYZ","shift":"morning"}"#,
        extrawork: Some(0),
    },
    SeedResource {
        name: "Grúa Torre GT-500",
        resource_type: "equipment",
        url: Some("https://example.com/equipment/crane-gt500"),
        metadata: r#"{"capacity":"5 tons","rental_daily":1500}"#,
        extrawork: Some(0),
    },
    SeedResource {
        name: "Pintura Exterior Premium",
        resource_type: "material",
        url: None,
        metadata: r#"{"quantity":"500 liters","brand":"DuraCoat"}"#,
        extrawork: Some(0),
    },
    SeedResource {
        name: "Técnicos HVAC Certificados",
        resource_type: "personnel",
        url: None,
        metadata: r#"{"size":4,"certifications":["EPA","NATE"]}"#,
        extrawork: Some(1),
    },
    SeedResource {
        name: "Sistema HVAC Carrier 50TCQ",
        resource_type: "equipment",
        url: Some("https://example.com/hvac/carrier-50tcq"),
        metadata: r#"{"capacity":"100 tons","warranty":"10 years"}"#,
        extrawork: Some(1),
    },
    SeedResource {
        name: "Equipo de Excavación",
        resource_type: "personnel",
        url: None,
        metadata: r#"{"size":12,"equipment_operators":3}"#,
        extrawork: Some(2),
    },
    SeedResource {
        name: "Excavadora Caterpillar 320D",
        resource_type: "equipment",
        url: Some("https://example.com/machinery/cat-320d"),
        metadata: r#"{"fuel":"diesel","rental_monthly":25000}"#,
        extrawork: Some(2),
    },
    SeedResource {
        name: "Concreto Premezclado",
        resource_type: "material",
        url: None,
        metadata: r#"{"quantity":"300 m3"}"#,
        extrawork: Some(2),
    },
    SeedResource {
        name: "Instaladores de Red",
        resource_type: "personnel",
        url: None,
        metadata: r#"{"size":6,"certifications":["BICSI"]}"#,
        extrawork: Some(3),
    },
    SeedResource {
        name: "Cable Cat 6A UTP",
        resource_type: "material",
        url: None,
        metadata: r#"{"quantity":"15000 meters","brand":"Panduit"}"#,
        extrawork: Some(3),
    },
    SeedResource {
        name: "Ingenieros Fotovoltaicos",
        resource_type: "personnel",
        url: None,
        metadata: r#"{"size":3,"certifications":["NABCEP"]}"#,
        extrawork: Some(4),
    },
    SeedResource {
        name: "Paneles Solares Jinko 550W",
        resource_type: "equipment",
        url: Some("https://example.com/solar/jinko-550w"),
        metadata: r#"{"quantity":200,"wattage":550}"#,
        extrawork: Some(4),
    },
    SeedResource {
        name: "Técnicos de Ascensores",
        resource_type: "personnel",
        url: Some("https://example.com/team/elevator-techs"),
        metadata: r#"{"size":5,"experience_years":15}"#,
        extrawork: Some(5),
    },
    SeedResource {
        name: "Sistema de Control Otis Gen3",
        resource_type: "equipment",
        url: Some("https://example.com/elevators/otis-gen3"),
        metadata: r#"{"capacity":"2000 kg","speed":"2.5 m/s"}"#,
        extrawork: Some(5),
    },
    SeedResource {
        name: "Andamio Tubular Multidireccional",
        resource_type: "equipment",
        url: None,
        metadata: r#"{"height":"30 m"}"#,
        extrawork: None,
    },
    SeedResource {
        name: "Generador Diésel 100 kVA",
        resource_type: "equipment",
        url: None,
        metadata: r#"{"fuel":"diesel","power":"100 kVA"}"#,
        extrawork: None,
    },
];

fn date_timestamp((y, m, d): (i32, u32, u32)) -> Option<i64> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Inserts the demo work items and resources. Does nothing when the
/// database already holds work items. Returns how many work items were added.
pub fn seed_demo_data(conn: &Connection) -> Result<usize> {
    if queries::count_extraworks(conn)? > 0 {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;

    let mut ids = Vec::with_capacity(EXTRAWORKS.len());
    for seed in EXTRAWORKS {
        let id = queries::insert_extrawork(
            &tx,
            &NewExtraWork {
                code: Some(seed.code.to_string()),
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                status: seed.status,
                priority: seed.priority,
                start_date: date_timestamp(seed.start),
                end_date: date_timestamp(seed.end),
            },
        )?;
        ids.push(id);
    }

    for seed in RESOURCES {
        queries::insert_resource(
            &tx,
            &NewResource {
                name: seed.name.to_string(),
                resource_type: seed.resource_type.to_string(),
                availability: None,
                url: seed.url.map(str::to_string),
                metadata: Some(seed.metadata.to_string()),
                extra_work_id: seed.extrawork.map(|idx| ids[idx]),
            },
        )?;
    }

    tx.commit()?;

    log::info!(
        "Seeded {} extraworks and {} resources",
        EXTRAWORKS.len(),
        RESOURCES.len()
    );

    Ok(EXTRAWORKS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_in_memory;

    #[test]
    fn seeding_is_idempotent() {
        let conn = open_in_memory().unwrap();
        assert_eq!(seed_demo_data(&conn).unwrap(), 6);
        assert_eq!(seed_demo_data(&conn).unwrap(), 0);

        assert_eq!(queries::count_extraworks(&conn).unwrap(), 6);
        assert_eq!(queries::list_resources(&conn).unwrap().len(), RESOURCES.len());
    }
}
