//! Built-in unit tables.
//!
//! Multipliers are the published factors to the table's base unit (meter,
//! square meter, cubic meter, kilogram, meter/second, pascal, watt).
//! Temperature is based on degrees Celsius.

use once_cell::sync::Lazy;

use super::{Conversion, UnitDef, UnitTable};

fn linear(key: &str, name: &str, symbol: &str, multiplier: f64) -> UnitDef {
    UnitDef {
        key: key.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        conversion: Conversion::Linear { multiplier },
    }
}

fn affine(key: &str, name: &str, symbol: &str, offset: f64, scale: f64) -> UnitDef {
    UnitDef {
        key: key.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        conversion: Conversion::Affine { offset, scale },
    }
}

pub static LENGTH: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "length",
        "meter",
        vec![
            linear("meter", "Meter", "m", 1.0),
            linear("kilometer", "Kilometer", "km", 1000.0),
            linear("centimeter", "Centimeter", "cm", 0.01),
            linear("millimeter", "Millimeter", "mm", 0.001),
            linear("mile", "Mile", "mi", 1609.34),
            linear("yard", "Yard", "yd", 0.9144),
            linear("foot", "Foot", "ft", 0.3048),
            linear("inch", "Inch", "in", 0.0254),
        ],
    )
});

pub static AREA: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "area",
        "square_meter",
        vec![
            linear("square_meter", "Square Meter", "m²", 1.0),
            linear("square_kilometer", "Square Kilometer", "km²", 1e6),
            linear("square_centimeter", "Square Centimeter", "cm²", 1e-4),
            linear("hectare", "Hectare", "ha", 10000.0),
            linear("acre", "Acre", "ac", 4046.86),
            linear("square_mile", "Square Mile", "mi²", 2.59e6),
            linear("square_yard", "Square Yard", "yd²", 0.836127),
            linear("square_foot", "Square Foot", "ft²", 0.092903),
            linear("square_inch", "Square Inch", "in²", 0.00064516),
        ],
    )
});

pub static VOLUME: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "volume",
        "cubic_meter",
        vec![
            linear("cubic_meter", "Cubic Meter", "m³", 1.0),
            linear("cubic_centimeter", "Cubic Centimeter", "cm³", 1e-6),
            linear("liter", "Liter", "L", 0.001),
            linear("milliliter", "Milliliter", "mL", 1e-6),
            linear("gallon_us", "US Gallon", "gal (US)", 0.00378541),
            linear("quart_us", "US Quart", "qt (US)", 0.000946353),
            linear("pint_us", "US Pint", "pt (US)", 0.000473176),
            linear("fluid_ounce_us", "US Fluid Ounce", "fl oz (US)", 2.95735e-5),
            linear("cubic_foot", "Cubic Foot", "ft³", 0.0283168),
            linear("cubic_inch", "Cubic Inch", "in³", 1.63871e-5),
        ],
    )
});

pub static WEIGHT: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "weight",
        "kilogram",
        vec![
            linear("kilogram", "Kilogram", "kg", 1.0),
            linear("gram", "Gram", "g", 0.001),
            linear("milligram", "Milligram", "mg", 1e-6),
            linear("pound", "Pound", "lb", 0.453592),
            linear("ounce", "Ounce", "oz", 0.0283495),
            linear("metric_ton", "Metric Ton", "t", 1000.0),
            linear("us_ton", "US Ton", "ton (US)", 907.185),
            linear("stone", "Stone", "st", 6.35029),
        ],
    )
});

pub static TEMPERATURE: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "temperature",
        "celsius",
        vec![
            affine("celsius", "Celsius", "°C", 0.0, 1.0),
            affine("fahrenheit", "Fahrenheit", "°F", -32.0, 5.0 / 9.0),
            affine("kelvin", "Kelvin", "K", -273.15, 1.0),
        ],
    )
});

pub static SPEED: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "speed",
        "meter_per_second",
        vec![
            linear("meter_per_second", "Meter/Second", "m/s", 1.0),
            linear("kilometer_per_hour", "Kilometer/Hour", "km/h", 0.277778),
            linear("mile_per_hour", "Mile/Hour", "mph", 0.44704),
            linear("foot_per_second", "Foot/Second", "ft/s", 0.3048),
            linear("knot", "Knot", "kn", 0.514444),
        ],
    )
});

pub static PRESSURE: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "pressure",
        "pascal",
        vec![
            linear("pascal", "Pascal", "Pa", 1.0),
            linear("kilopascal", "Kilopascal", "kPa", 1000.0),
            linear("bar", "Bar", "bar", 100000.0),
            linear("psi", "Pound-force per sq inch", "psi", 6894.76),
            linear("atm", "Atmosphere", "atm", 101325.0),
            linear("torr", "Torr", "Torr", 133.322),
        ],
    )
});

pub static POWER: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "power",
        "watt",
        vec![
            linear("watt", "Watt", "W", 1.0),
            linear("kilowatt", "Kilowatt", "kW", 1000.0),
            linear("megawatt", "Megawatt", "MW", 1e6),
            linear("horsepower", "Horsepower (metric)", "hp (metric)", 735.499),
            linear("horsepower_us", "Horsepower (US)", "hp (US)", 745.7),
            linear("foot_pound_per_minute", "Foot-pound/minute", "ft-lb/min", 0.02259696),
            // 1 J/s = 1 W
            linear("joule_per_second", "Joule/second", "J/s", 1.0),
        ],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(LENGTH.units.len(), 8);
        assert_eq!(AREA.units.len(), 9);
        assert_eq!(VOLUME.units.len(), 10);
        assert_eq!(WEIGHT.units.len(), 8);
        assert_eq!(TEMPERATURE.units.len(), 3);
        assert_eq!(SPEED.units.len(), 5);
        assert_eq!(PRESSURE.units.len(), 6);
        assert_eq!(POWER.units.len(), 7);
    }

    #[test]
    fn test_joule_per_second_equals_watt() {
        assert_eq!(POWER.convert_value(42.0, "joule_per_second", "watt").unwrap(), 42.0);
    }
}
