use contracts::domain::a003_order::aggregate::Order;

/// Выбранные заказы в порядке выбора.
///
/// Выбор не привязан к рабочему набору: при смене области или типа услуги
/// ранее отмеченные заказы остаются отмеченными.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSelection {
    ids: Vec<String>,
}

impl OrderSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    pub fn select(&mut self, id: &str) {
        if !self.contains(id) {
            self.ids.push(id.to_string());
        }
    }

    pub fn deselect(&mut self, id: &str) {
        self.ids.retain(|selected| selected != id);
    }

    /// Переключить отметку; возвращает новое состояние
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.contains(id) {
            self.deselect(id);
            false
        } else {
            self.select(id);
            true
        }
    }

    /// Отметить все видимые заказы, добавляя к уже выбранным
    pub fn select_all(&mut self, visible: &[&Order]) {
        for order in visible {
            self.select(&order.id);
        }
    }

    /// Снять отметку только с видимых заказов
    pub fn deselect_all(&mut self, visible: &[&Order]) {
        self.ids
            .retain(|selected| !visible.iter().any(|order| &order.id == selected));
    }

    /// Все ли видимые заказы отмечены
    pub fn covers(&self, visible: &[&Order]) -> bool {
        !visible.is_empty() && visible.iter().all(|order| self.contains(&order.id))
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a002_batch::grouping::tests::order;

    #[test]
    fn test_toggle_keeps_selection_order() {
        let mut selection = OrderSelection::new();
        assert!(selection.toggle("b"));
        assert!(selection.toggle("a"));
        selection.select("b");
        assert_eq!(selection.ids(), ["b", "a"]);
        assert!(!selection.toggle("b"));
        assert_eq!(selection.ids(), ["a"]);
    }

    #[test]
    fn test_select_all_is_additive_and_deselect_all_is_scoped() {
        let standard = [order("o1", 1.0, false), order("o2", 1.0, false)];
        let express = [order("o3", 1.0, false)];
        let standard_view: Vec<&Order> = standard.iter().collect();
        let express_view: Vec<&Order> = express.iter().collect();

        let mut selection = OrderSelection::new();
        selection.select_all(&standard_view);
        selection.select_all(&express_view);
        assert_eq!(selection.len(), 3);
        assert!(selection.covers(&standard_view));

        selection.deselect_all(&standard_view);
        assert_eq!(selection.ids(), ["o3"]);
        assert!(!selection.covers(&standard_view));
        assert!(!selection.covers(&[]));
    }
}
