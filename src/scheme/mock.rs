use super::SchemeModel;
use serde_json::{json, Map, Value};

/// Fixed example schemes shown while no live session has produced results.
pub fn all_schemes() -> Vec<SchemeModel> {
    vec![
        scheme(
            1,
            json!({
                "grid_spacing_x": 8.0,
                "grid_spacing_y": 8.0,
                "x_extents": [0, 5],
                "y_extents": [0, 5],
                "num_floors": 5,
                "floor_height": 3.5
            }),
            json!({
                "steel_tonnage": 450,
                "column_size": "UC305x305x97",
                "beam_size": "UB457x191x82",
                "carbon_footprint": 650,
                "cost_per_sqm": 2500
            }),
            (5.0, 5.0, 5.0),
            "#4287f5",
        ),
        scheme(
            2,
            json!({
                "grid_spacing_x": 7.5,
                "grid_spacing_y": 7.5,
                "x_extents": [0, 6],
                "y_extents": [0, 6],
                "num_floors": 8,
                "floor_height": 3.2
            }),
            json!({
                "steel_tonnage": 720,
                "column_size": "UC356x368x129",
                "beam_size": "UB533x210x92",
                "carbon_footprint": 980,
                "cost_per_sqm": 2800
            }),
            (6.0, 8.0, 6.0),
            "#42b883",
        ),
        scheme(
            3,
            json!({
                "grid_spacing_x": 9.0,
                "grid_spacing_y": 9.0,
                "x_extents": [0, 4],
                "y_extents": [0, 4],
                "num_floors": 4,
                "floor_height": 4.0
            }),
            json!({
                "steel_tonnage": 380,
                "column_size": "UC254x254x73",
                "beam_size": "UB406x178x60",
                "carbon_footprint": 520,
                "cost_per_sqm": 2300
            }),
            (4.0, 4.0, 4.0),
            "#e74c3c",
        ),
        scheme(
            4,
            json!({
                "grid_spacing_x": 8.5,
                "grid_spacing_y": 8.5,
                "x_extents": [0, 5],
                "y_extents": [0, 5],
                "num_floors": 6,
                "floor_height": 3.8
            }),
            json!({
                "steel_tonnage": 550,
                "column_size": "UC305x305x97",
                "beam_size": "UB457x191x82",
                "carbon_footprint": 750,
                "cost_per_sqm": 2600
            }),
            (5.0, 6.0, 5.0),
            "#9b59b6",
        ),
    ]
}

fn scheme(
    id: u32,
    parameters: Value,
    evaluations: Value,
    (width, height, depth): (f64, f64, f64),
    color: &str,
) -> SchemeModel {
    SchemeModel {
        id,
        width,
        height,
        depth,
        color: color.to_string(),
        parameters: as_map(parameters),
        evaluations: as_map(evaluations),
    }
}

fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provides_four_stable_schemes() {
        let schemes = all_schemes();
        assert_eq!(schemes.len(), 4);
        let ids: Vec<u32> = schemes.iter().map(|scheme| scheme.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn schemes_preserve_parameter_order() {
        let schemes = all_schemes();
        let keys: Vec<&str> = schemes[0].parameters.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "grid_spacing_x",
                "grid_spacing_y",
                "x_extents",
                "y_extents",
                "num_floors",
                "floor_height"
            ]
        );
    }

    #[test]
    fn repairs_survive_the_fixed_data() {
        for scheme in all_schemes() {
            assert!(scheme.width > 0.0 && scheme.height > 0.0 && scheme.depth > 0.0);
            assert!(scheme.color.starts_with('#'));
        }
    }
}
