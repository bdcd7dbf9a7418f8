use contracts::domain::a003_order::aggregate::{Order, RawGroupedOrders};
use contracts::enums::{ServiceType, ShippingScope};
use std::collections::{BTreeMap, HashMap, HashSet};

type RouteGroups = BTreeMap<String, BTreeMap<ServiceType, Vec<Order>>>;

/// Заказы, сгруппированные по области → маршруту → типу услуги.
///
/// Ключи API нормализуются один раз при построении; дальше все обращения
/// идут по каноническим [`ShippingScope`] и [`ServiceType`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedOrders {
    scopes: BTreeMap<ShippingScope, RouteGroups>,
}

impl GroupedOrders {
    pub fn from_wire(raw: RawGroupedOrders) -> Self {
        let mut scopes: BTreeMap<ShippingScope, RouteGroups> = BTreeMap::new();
        // Заказ учитывается в области один раз, даже если пришёл под TOWN и IN_TOWN
        let mut seen: HashMap<ShippingScope, HashSet<String>> = HashMap::new();

        for (scope_key, routes) in sorted(raw) {
            let Some(scope) = ShippingScope::from_wire(&scope_key) else {
                tracing::warn!("Skipping orders under unknown scope key '{}'", scope_key);
                continue;
            };
            let scope_groups = scopes.entry(scope).or_default();
            let scope_seen = seen.entry(scope).or_default();

            for (route_key, by_service_type) in sorted(routes) {
                for (service_type_key, orders) in sorted(by_service_type) {
                    let Some(service_type) = ServiceType::from_code(&service_type_key) else {
                        tracing::warn!(
                            "Skipping {} orders under unknown service type '{}' ({} / {})",
                            orders.len(),
                            service_type_key,
                            scope_key,
                            route_key
                        );
                        continue;
                    };
                    let bucket = scope_groups
                        .entry(route_key.clone())
                        .or_default()
                        .entry(service_type)
                        .or_default();
                    for order in orders {
                        if scope_seen.insert(order.id.clone()) {
                            bucket.push(order);
                        } else {
                            tracing::debug!("Duplicate order {} in {:?}", order.id, scope);
                        }
                    }
                }
            }
        }

        Self { scopes }
    }

    fn orders_in(&self, scope: ShippingScope) -> impl Iterator<Item = (ServiceType, &Order)> + '_ {
        self.scopes
            .get(&scope)
            .into_iter()
            .flat_map(|routes| routes.values())
            .flat_map(|by_type| by_type.iter())
            .flat_map(|(service_type, orders)| orders.iter().map(move |o| (*service_type, o)))
    }

    /// Число заказов по типам услуги в области (по всем маршрутам); нули включены
    pub fn service_type_counts(&self, scope: ShippingScope) -> BTreeMap<ServiceType, usize> {
        let mut counts: BTreeMap<ServiceType, usize> =
            ServiceType::all().into_iter().map(|st| (st, 0)).collect();
        for (service_type, _) in self.orders_in(scope) {
            *counts.entry(service_type).or_default() += 1;
        }
        counts
    }

    pub fn scope_total(&self, scope: ShippingScope) -> usize {
        self.orders_in(scope).count()
    }

    /// Итог по каждой области, включая пустые
    pub fn scope_totals(&self) -> BTreeMap<ShippingScope, usize> {
        ShippingScope::all()
            .into_iter()
            .map(|scope| (scope, self.scope_total(scope)))
            .collect()
    }

    pub fn is_scope_available(&self, scope: ShippingScope) -> bool {
        self.scope_total(scope) > 0
    }

    pub fn is_service_type_available(&self, scope: ShippingScope, service_type: ServiceType) -> bool {
        self.orders_in(scope).any(|(st, _)| st == service_type)
    }

    /// Рабочий набор: заказы области по всем маршрутам с данным типом услуги
    pub fn working_set(&self, scope: ShippingScope, service_type: ServiceType) -> Vec<&Order> {
        self.orders_in(scope)
            .filter(|(st, _)| *st == service_type)
            .map(|(_, order)| order)
            .collect()
    }

    pub fn route_keys(&self, scope: ShippingScope) -> Vec<&str> {
        self.scopes
            .get(&scope)
            .map(|routes| routes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(|routes| {
            routes
                .values()
                .all(|by_type| by_type.values().all(Vec::is_empty))
        })
    }
}

fn sorted<V>(map: HashMap<String, V>) -> Vec<(String, V)> {
    let mut entries: Vec<_> = map.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use maplit::hashmap;

    pub fn order(id: &str, weight: f64, fragile: bool) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "trackingCode": format!("TRK-{}", id),
            "weight": weight,
            "isFragile": fragile,
            "category": ["parcel"],
        }))
        .unwrap()
    }

    pub fn sample() -> RawGroupedOrders {
        hashmap! {
            "TOWN".to_string() => hashmap! {
                "CENTER->NORTH".to_string() => hashmap! {
                    "STANDARD".to_string() => vec![order("o1", 2.0, false), order("o2", 3.5, true)],
                    "EXPRESS".to_string() => vec![order("o3", 1.0, false)],
                },
                "CENTER->SOUTH".to_string() => hashmap! {
                    "STANDARD".to_string() => vec![order("o4", 4.0, false)],
                },
            },
            "REGIONAL".to_string() => hashmap! {
                "HUB-A".to_string() => hashmap! {
                    "OVERNIGHT".to_string() => vec![order("o5", 10.0, false)],
                    "ECONOMY".to_string() => vec![order("o6", 1.0, false)],
                },
            },
            "MARS".to_string() => hashmap! {},
        }
    }

    #[test]
    fn test_counts_per_service_type_sum_to_scope_total() {
        let grouped = GroupedOrders::from_wire(sample());
        for scope in ShippingScope::all() {
            let counts = grouped.service_type_counts(scope);
            assert_eq!(counts.len(), 3);
            assert_eq!(counts.values().sum::<usize>(), grouped.scope_total(scope));
        }

        let town = grouped.service_type_counts(ShippingScope::InTown);
        assert_eq!(town[&ServiceType::Standard], 3);
        assert_eq!(town[&ServiceType::Express], 1);
        assert_eq!(town[&ServiceType::Overnight], 0);

        let totals = grouped.scope_totals();
        assert_eq!(totals[&ShippingScope::InTown], 4);
        assert_eq!(totals[&ShippingScope::Regional], 1);
        assert_eq!(totals[&ShippingScope::International], 0);
    }

    #[test]
    fn test_availability_flags() {
        let grouped = GroupedOrders::from_wire(sample());
        assert!(grouped.is_scope_available(ShippingScope::Regional));
        assert!(!grouped.is_scope_available(ShippingScope::International));
        assert!(grouped.is_service_type_available(ShippingScope::InTown, ServiceType::Express));
        assert!(!grouped.is_service_type_available(ShippingScope::Regional, ServiceType::Standard));
    }

    #[test]
    fn test_working_set_spans_routes() {
        let grouped = GroupedOrders::from_wire(sample());
        let ids: Vec<&str> = grouped
            .working_set(ShippingScope::InTown, ServiceType::Standard)
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["o1", "o2", "o4"]);
        assert_eq!(
            grouped.route_keys(ShippingScope::InTown),
            vec!["CENTER->NORTH", "CENTER->SOUTH"]
        );
    }

    #[test]
    fn test_town_and_in_town_keys_merge() {
        let raw = hashmap! {
            "TOWN".to_string() => hashmap! {
                "R1".to_string() => hashmap! {
                    "STANDARD".to_string() => vec![order("o1", 1.0, false)],
                },
            },
            "IN_TOWN".to_string() => hashmap! {
                "R1".to_string() => hashmap! {
                    "STANDARD".to_string() => vec![order("o1", 1.0, false), order("o2", 1.0, false)],
                },
            },
        };
        let grouped = GroupedOrders::from_wire(raw);
        assert_eq!(grouped.scope_total(ShippingScope::InTown), 2);
        assert!(!grouped.is_empty());
        assert!(GroupedOrders::default().is_empty());
    }

    #[test]
    fn test_order_counted_once_across_routes_of_merged_scope() {
        let raw = hashmap! {
            "TOWN".to_string() => hashmap! {
                "R1".to_string() => hashmap! {
                    "STANDARD".to_string() => vec![order("o1", 1.0, false)],
                },
            },
            "IN_TOWN".to_string() => hashmap! {
                "R2".to_string() => hashmap! {
                    "STANDARD".to_string() => vec![order("o1", 1.0, false), order("o2", 1.0, false)],
                },
            },
        };
        let grouped = GroupedOrders::from_wire(raw);
        assert_eq!(grouped.scope_total(ShippingScope::InTown), 2);
        assert_eq!(grouped.service_type_counts(ShippingScope::InTown)[&ServiceType::Standard], 2);
        let ids: Vec<&str> = grouped
            .working_set(ShippingScope::InTown, ServiceType::Standard)
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["o1", "o2"]);
    }
}
