//! Quantity kind registry
//!
//! A quantity kind names a measurement semantics ("Frequency",
//! "Radioactivity") and pairs it with a dimension and a natural unit.
//! Kinds with the same dimension stay distinct; dimension lookups resolve
//! to the first kind registered for that dimension.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard};

use crate::{Dimension, Unit, UnitError};

/// A named measurement semantics with its dimension and natural unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityKind {
    name: String,
    dimension: Dimension,
    unit: Unit,
}

impl QuantityKind {
    pub fn new(name: impl Into<String>, unit: Unit) -> Self {
        QuantityKind {
            name: name.into(),
            dimension: unit.dimension(),
            unit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// The unit quantities of this kind are expressed in by default
    pub fn unit(&self) -> &Unit {
        &self.unit
    }
}

/// Registry of quantity kinds, keyed by case-insensitive name.
///
/// Registration order matters: `get_by_dimension` returns the earliest
/// registered kind whose dimension matches.
pub struct KindRegistry {
    kinds: HashMap<String, Arc<QuantityKind>>,
    order: Vec<Arc<QuantityKind>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: QuantityKind) -> Self {
        self.register(kind);
        self
    }

    /// Register a kind. The first registration of a name wins; a repeat
    /// under the same name is ignored.
    pub fn register(&mut self, kind: QuantityKind) -> bool {
        let key = kind.name.to_lowercase();
        if self.kinds.contains_key(&key) {
            tracing::debug!(name = %kind.name, "quantity kind already registered, skipping");
            return false;
        }
        tracing::debug!(name = %kind.name, dimension = %kind.dimension, "registered quantity kind");
        let kind = Arc::new(kind);
        self.kinds.insert(key, Arc::clone(&kind));
        self.order.push(kind);
        true
    }

    pub fn get(&self, name: &str) -> Option<Arc<QuantityKind>> {
        self.kinds.get(&name.to_lowercase()).cloned()
    }

    /// The earliest registered kind with this dimension
    pub fn get_by_dimension(&self, dimension: &Dimension) -> Option<Arc<QuantityKind>> {
        self.order
            .iter()
            .find(|kind| kind.dimension == *dimension)
            .cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.order.iter().map(|kind| kind.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: OnceLock<RwLock<KindRegistry>> = OnceLock::new();

fn global() -> &'static RwLock<KindRegistry> {
    GLOBAL.get_or_init(|| RwLock::new(KindRegistry::new()))
}

/// Read access to the process-wide registry
pub fn registry() -> RwLockReadGuard<'static, KindRegistry> {
    match global().read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Register a kind in the process-wide registry
pub fn register_kind(kind: QuantityKind) -> bool {
    match global().write() {
        Ok(mut guard) => guard.register(kind),
        Err(poisoned) => poisoned.into_inner().register(kind),
    }
}

/// Resolve a kind by name in the process-wide registry
pub fn kind_named(name: &str) -> Result<Arc<QuantityKind>, UnitError> {
    registry()
        .get(name)
        .ok_or_else(|| UnitError::UnknownKind(name.to_string()))
}

/// Resolve the earliest registered kind with this dimension
pub fn kind_for_dimension(dimension: &Dimension) -> Option<Arc<QuantityKind>> {
    registry().get_by_dimension(dimension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitConverter;

    fn second() -> Unit {
        Unit::base("s", Dimension::TIME)
    }

    #[test]
    fn test_register_and_lookup() {
        let hertz = second().pow(-1).unwrap().alternate("Hz").unwrap();
        let mut registry = KindRegistry::new();
        assert!(registry.register(QuantityKind::new("Frequency", hertz.clone())));

        let kind = registry.get("frequency").unwrap();
        assert_eq!(kind.name(), "Frequency");
        assert_eq!(kind.dimension(), Dimension::FREQUENCY);
        assert_eq!(kind.unit(), &hertz);
        assert!(registry.get("radioactivity").is_none());
    }

    #[test]
    fn test_duplicate_name_ignored() {
        let hertz = second().pow(-1).unwrap().alternate("Hz").unwrap();
        let mut registry = KindRegistry::new();
        assert!(registry.register(QuantityKind::new("Frequency", hertz.clone())));
        assert!(!registry.register(QuantityKind::new("frequency", hertz)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dimension_lookup_first_wins() {
        let hertz = second().pow(-1).unwrap().alternate("Hz").unwrap();
        let becquerel = second().pow(-1).unwrap().alternate("Bq").unwrap();

        let registry = KindRegistry::new()
            .with_kind(QuantityKind::new("Frequency", hertz))
            .with_kind(QuantityKind::new("Radioactivity", becquerel));

        let found = registry.get_by_dimension(&Dimension::FREQUENCY).unwrap();
        assert_eq!(found.name(), "Frequency");
        assert!(registry
            .get_by_dimension(&Dimension::FORCE)
            .is_none());
    }

    #[test]
    fn test_kind_for_transformed_unit() {
        let kelvin = Unit::base("K", Dimension::TEMPERATURE);
        let celsius = kelvin.transform(UnitConverter::shift(
            mensura_core::Rational::new(27315, 100).unwrap(),
        ));
        let kind = QuantityKind::new("Temperature", celsius.clone());
        assert_eq!(kind.dimension(), Dimension::TEMPERATURE);
        assert_eq!(kind.unit(), &celsius);
    }
}
