//! Generates copy and zero-predicate methods for a small style sheet model.
//!
//! Run with: `RUST_LOG=debug cargo run --example css_properties`

use clonegen::prelude::*;

fn style_table() -> Result<TypeTable, SchemaError> {
    TypeTable::with_primitives()
        .with("Image", TypeDef::capability())
        .and_then(|t| t.with("Length", TypeDef::alias("f32")))
        .and_then(|t| {
            t.with(
                "Color",
                RecordDef::new()
                    .field("r", "u8")
                    .field("g", "u8")
                    .field("b", "u8")
                    .field("a", "u8"),
            )
        })
        .and_then(|t| t.with("Corners", TypeDef::fixed(4, "Length")))
        .and_then(|t| {
            t.with(
                "ColorStop",
                RecordDef::new().field("color", "Color").field("position", "Length"),
            )
        })
        .and_then(|t| t.with("ColorStops", TypeDef::dynamic("ColorStop")))
        .and_then(|t| {
            t.with(
                "LinearGradient",
                RecordDef::new().field("angle", "f32").field("stops", "ColorStops"),
            )
        })
        .and_then(|t| t.with("Url", RecordDef::new().field("href", "String")))
        .and_then(|t| {
            t.with(
                "BackgroundLayer",
                RecordDef::new()
                    .field("image", "Image")
                    .field("size", "Length")
                    .field("repeat", "bool"),
            )
        })
        .and_then(|t| t.with("BackgroundLayers", TypeDef::dynamic("BackgroundLayer")))
        .and_then(|t| {
            t.with(
                "Background",
                RecordDef::new()
                    .field("color", "Color")
                    .field("layers", "BackgroundLayers")
                    .field("radius", "Corners"),
            )
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let table = style_table()?;
    let roots = ["Background", "LinearGradient", "Url", "Color"];

    let config = GeneratorConfig::default()
        .public_trait("CssProperty")
        .public_method("copy_property");
    let generator = Generator::with_config(&table, config);

    let synthesis = generator.synthesize(&roots)?;
    for family in [
        MethodFamily::PublicCopy,
        MethodFamily::PrivateCopy,
        MethodFamily::ZeroPredicate,
    ] {
        println!("{}: {}", family, synthesis.names(family).join(", "));
    }

    let mut eval = Evaluator::new(&table, &synthesis);
    let gradient = Value::record([
        ("angle", Value::Float(45.0)),
        (
            "stops",
            Value::seq(vec![Value::record([
                (
                    "color",
                    Value::record([
                        ("r", Value::Int(255)),
                        ("g", Value::Int(0)),
                        ("b", Value::Int(0)),
                        ("a", Value::Int(255)),
                    ]),
                ),
                ("position", Value::Float(0.0)),
            ])]),
        ),
    ]);
    let copy = eval.copy("LinearGradient", &gradient)?;
    let shared = match (copy.field("stops"), gradient.field("stops")) {
        (Some(a), Some(b)) => a.shares_storage(b),
        _ => false,
    };
    println!("gradient copy equal: {}, shares stops: {}", copy == gradient, shared);

    let code = generator.generate(&roots)?;
    println!("{}", code.to_source());
    Ok(())
}
