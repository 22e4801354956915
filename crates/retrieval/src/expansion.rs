use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Static category → keyword expansion table.
///
/// Test categories name broad disciplines; requirement text names concrete
/// phenomena. The table bridges the two so that a "mechanical" query also
/// hits requirements speaking of vibration or shock.
static CATEGORY_KEYWORDS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        let mut map: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        map.insert(
            "thermal",
            &[
                "temperature", "heat", "thermal", "cold", "hot", "celsius", "°c", "climate",
                "shock",
            ][..],
        );
        map.insert(
            "mechanical",
            &["vibration", "shock", "mechanical", "force", "stress", "impact", "drop"][..],
        );
        map.insert(
            "environmental",
            &[
                "humidity", "water", "dust", "environment", "climate", "moisture", "salt",
                "corrosion", "ingress",
            ][..],
        );
        map.insert(
            "electrical",
            &[
                "voltage", "current", "electrical", "power", "resistance", "insulation",
                "dielectric", "short",
            ][..],
        );
        map.insert(
            "emc",
            &[
                "emc",
                "electromagnetic",
                "interference",
                "emission",
                "immunity",
                "electrostatic",
                "esd",
                "conducted",
                "radiated",
            ][..],
        );
        map.insert(
            "durability",
            &["durability", "life", "cycle", "endurance", "aging", "wear"][..],
        );
        map
    });

/// Expand a test category into its associated keywords. Unknown categories
/// expand to nothing.
pub fn expand_categories(category: &str) -> &'static [&'static str] {
    CATEGORY_KEYWORDS
        .get(category.to_lowercase().as_str())
        .copied()
        .unwrap_or(&[])
}
