use std::io::Write;

use serde::Serialize;

use crate::types::{Bha, BhaComponent};

use super::InterchangeError;

#[derive(Serialize)]
struct ComponentRow<'a> {
    position: usize,
    name: &'a str,
    component_type: &'static str,
    length: f64,
    outer_diameter: f64,
    inner_diameter: Option<f64>,
    weight: Option<f64>,
    position_from_bit: f64,
    manufacturer: Option<&'a str>,
    model: Option<&'a str>,
    serial_number: Option<&'a str>,
}

impl<'a> ComponentRow<'a> {
    fn new(position: usize, c: &'a BhaComponent) -> Self {
        Self {
            position,
            name: &c.name,
            component_type: c.component_type.as_str(),
            length: c.length,
            outer_diameter: c.outer_diameter,
            inner_diameter: c.inner_diameter,
            weight: c.weight,
            position_from_bit: c.position_from_bit,
            manufacturer: c.manufacturer.as_deref(),
            model: c.model.as_deref(),
            serial_number: c.serial_number.as_deref(),
        }
    }
}

/// Write BHA components, bit first, one row each.
pub fn export_bha_csv<W: Write>(bha: &Bha, writer: W) -> Result<(), InterchangeError> {
    if bha.components.is_empty() {
        return Err(InterchangeError::NoComponents);
    }
    let mut ordered: Vec<&BhaComponent> = bha.components.iter().collect();
    ordered.sort_by(|a, b| a.position_from_bit.total_cmp(&b.position_from_bit));

    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for (i, component) in ordered.into_iter().enumerate() {
        wtr.serialize(ComponentRow::new(i + 1, component))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentType, UnitSystem};

    #[test]
    fn test_bha_rows_from_bit() {
        let mut bha = Bha::new("w", "Run 2", UnitSystem::Imperial);
        let mut mwd = BhaComponent::new("MWD", ComponentType::Mwd, 30.0, 6.75, 35.0);
        mwd.manufacturer = Some("Acme".to_string());
        bha.components.push(mwd);
        bha.components.push(BhaComponent::new("Bit", ComponentType::Bit, 1.0, 8.5, 0.0));

        let mut out = Vec::new();
        export_bha_csv(&bha, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "position,name,component_type,length,outer_diameter,inner_diameter,weight,position_from_bit,manufacturer,model,serial_number"
        );
        assert_eq!(lines[1], "1,Bit,bit,1.0,8.5,,,0.0,,,");
        assert_eq!(lines[2], "2,MWD,mwd,30.0,6.75,,,35.0,Acme,,");
    }

    #[test]
    fn test_empty_bha() {
        let bha = Bha::new("w", "Empty", UnitSystem::Metric);
        assert!(matches!(
            export_bha_csv(&bha, Vec::new()),
            Err(InterchangeError::NoComponents)
        ));
    }
}
