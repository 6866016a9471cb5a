use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{CollectionConfig, SchemaRegistry};

/// Summary of dependency graph structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencySummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Report for dependency ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    pub summary: DependencySummary,
    pub order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

/// Order collections so that each one follows every collection it references.
///
/// Collections without dependencies come first in declaration order; each following pass
/// appends, again in declaration order, the collections whose dependencies are all placed.
/// A pass that places nothing means the remaining collections form (or hang off) a cycle.
pub fn sort_collections(registry: &SchemaRegistry) -> Result<Vec<&CollectionConfig>> {
    let configs: Vec<&CollectionConfig> = registry.iter().collect();
    sort_configs(&configs)
}

/// Build a dependency report; cycles are reported instead of returned as errors.
pub fn build_dependency_report(registry: &SchemaRegistry) -> Result<DependencyReport> {
    let summary = DependencySummary {
        nodes: registry.len(),
        edges: registry
            .iter()
            .map(|config| config.dependencies().len())
            .sum(),
    };

    match sort_collections(registry) {
        Ok(order) => Ok(DependencyReport {
            summary,
            order: Some(order.iter().map(|config| config.name.clone()).collect()),
            cycle: None,
        }),
        Err(Error::DependencyCycle { collections }) => Ok(DependencyReport {
            summary,
            order: None,
            cycle: Some(collections),
        }),
        Err(err) => Err(err),
    }
}

fn sort_configs<'a>(configs: &[&'a CollectionConfig]) -> Result<Vec<&'a CollectionConfig>> {
    let known: BTreeSet<&str> = configs.iter().map(|config| config.name.as_str()).collect();
    for config in configs {
        if let Some(missing) = config
            .dependencies()
            .into_iter()
            .find(|dep| !known.contains(dep))
        {
            return Err(Error::UnknownCollection(missing.to_string()));
        }
    }

    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut sorted: Vec<&'a CollectionConfig> = Vec::with_capacity(configs.len());

    for &config in configs {
        if config.dependencies().is_empty() {
            sorted.push(config);
            visited.insert(config.name.as_str());
        }
    }

    // Each productive pass places at least one collection, so N passes always suffice.
    for _ in 0..configs.len() {
        if sorted.len() == configs.len() {
            break;
        }

        let mut placed = false;
        for &config in configs {
            if visited.contains(config.name.as_str()) {
                continue;
            }
            let ready = config
                .dependencies()
                .iter()
                .all(|dep| visited.contains(dep));
            if ready {
                sorted.push(config);
                visited.insert(config.name.as_str());
                placed = true;
            }
        }

        if !placed {
            break;
        }
    }

    if sorted.len() == configs.len() {
        Ok(sorted)
    } else {
        let collections = configs
            .iter()
            .filter(|config| !visited.contains(config.name.as_str()))
            .map(|config| config.name.clone())
            .collect();
        Err(Error::DependencyCycle { collections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    fn config(name: &str, deps: &[&str]) -> CollectionConfig {
        let mut fields = vec![FieldSpec::string("name")];
        fields.extend(
            deps.iter()
                .map(|dep| FieldSpec::foreign_key(format!("{dep}_ref"), *dep)),
        );
        CollectionConfig {
            name: name.to_string(),
            fields,
            prompt_template: String::new(),
            sample_size: 2,
        }
    }

    fn names(order: &[&CollectionConfig]) -> Vec<String> {
        order.iter().map(|config| config.name.clone()).collect()
    }

    #[test]
    fn products_follow_brands_and_categories() {
        let registry = SchemaRegistry::new(vec![
            config("products", &["brands", "categories"]),
            config("brands", &[]),
            config("categories", &[]),
        ])
        .unwrap();

        let order = names(&sort_collections(&registry).unwrap());
        assert_eq!(order, vec!["brands", "categories", "products"]);
    }

    #[test]
    fn chains_resolve_over_several_passes() {
        let registry = SchemaRegistry::new(vec![
            config("reviews", &["orders"]),
            config("orders", &["customers", "products"]),
            config("products", &["brands"]),
            config("customers", &[]),
            config("brands", &[]),
        ])
        .unwrap();

        let order = names(&sort_collections(&registry).unwrap());
        assert_eq!(
            order,
            vec!["customers", "brands", "products", "orders", "reviews"]
        );
    }

    #[test]
    fn mutual_references_report_cycle() {
        let registry = SchemaRegistry::new(vec![
            config("brands", &[]),
            config("a", &["b"]),
            config("b", &["a"]),
            config("c", &["a", "brands"]),
        ])
        .unwrap();

        let err = sort_collections(&registry).unwrap_err();
        match err {
            Error::DependencyCycle { collections } => {
                assert_eq!(collections, vec!["a", "b", "c"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let registry = SchemaRegistry::new(vec![config("categories", &["categories"])]).unwrap();
        assert!(matches!(
            sort_collections(&registry),
            Err(Error::DependencyCycle { .. })
        ));
    }

    #[test]
    fn report_lists_cycle_instead_of_order() {
        let registry =
            SchemaRegistry::new(vec![config("a", &["b"]), config("b", &["a"])]).unwrap();
        let report = build_dependency_report(&registry).unwrap();
        assert!(report.order.is_none());
        assert_eq!(report.cycle.unwrap(), vec!["a", "b"]);
        assert_eq!(report.summary.nodes, 2);
        assert_eq!(report.summary.edges, 2);
    }

    #[test]
    fn unknown_dependency_is_rejected_by_sorter() {
        let products = config("products", &["brands"]);
        let err = sort_configs(&[&products]).unwrap_err();
        assert!(matches!(err, Error::UnknownCollection(name) if name == "brands"));
    }
}
