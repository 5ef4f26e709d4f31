use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Flat per-call rate applied to models missing from the table.
pub const DEFAULT_COST_USD: f64 = 0.002;

/// Estimated cost in USD of one call, by model id.
static MODEL_COSTS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let mut costs = HashMap::new();
    costs.insert("gemini-2.5-flash", 0.001);
    costs.insert("gemini-2.5-flash-lite", 0.0004);
    costs.insert("gemini-2.5-pro", 0.0125);
    costs.insert("gemini-2.5-flash-image", 0.039);
    costs
});

pub fn estimated_cost_usd(model_id: &str) -> f64 {
    MODEL_COSTS
        .get(model_id)
        .copied()
        .unwrap_or(DEFAULT_COST_USD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_rate() {
        assert_eq!(estimated_cost_usd("gemini-2.5-flash-image"), 0.039);
    }

    #[test]
    fn test_unknown_model_uses_default_rate() {
        assert_eq!(estimated_cost_usd("experimental-model-x"), DEFAULT_COST_USD);
    }
}
