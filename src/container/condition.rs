//! Composable activation predicates, evaluated once per bean definition, in
//! registration order, against the properties and the beans that are
//! already known to be active earlier in that same order.

use crate::error::WeaveError;

use super::bean::Selector;

/// What a [`Condition`] consults to decide whether its bean is active.
pub trait ConditionView {
    fn has_property(&self, key: &str) -> bool;
    fn property(&self, key: &str) -> Option<String>;
    fn has_active_bean(&self, selector: &Selector) -> bool;
    fn active_bean_count(&self, selector: &Selector) -> usize;
    fn active_profile(&self, name: &str) -> bool;
}

/// A composable gate on whether a bean definition participates in a given
/// refresh.
#[derive(Clone)]
pub enum Condition {
    OnProperty(String),
    OnMissingProperty(String),
    OnPropertyEquals(String, String),
    OnBean(Selector),
    OnMissingBean(Selector),
    OnSingleBean(Selector),
    OnProfile(String),
    OnExpression(String),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn evaluate(&self, view: &dyn ConditionView) -> Result<bool, WeaveError> {
        match self {
            Condition::OnProperty(key) => Ok(view.has_property(key)),
            Condition::OnMissingProperty(key) => Ok(!view.has_property(key)),
            Condition::OnPropertyEquals(key, expected) => {
                Ok(view.property(key).as_deref() == Some(expected.as_str()))
            }
            Condition::OnBean(sel) => Ok(view.has_active_bean(sel)),
            Condition::OnMissingBean(sel) => Ok(!view.has_active_bean(sel)),
            Condition::OnSingleBean(sel) => Ok(view.active_bean_count(sel) == 1),
            Condition::OnProfile(name) => Ok(view.active_profile(name)),
            Condition::OnExpression(expr) => Err(WeaveError::resolution(format!(
                "condition expression \"{expr}\": expression conditions are not implemented"
            ))),
            Condition::And(parts) => {
                for part in parts {
                    if !part.evaluate(view)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Or(parts) => {
                for part in parts {
                    if part.evaluate(view)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Not(inner) => Ok(!inner.evaluate(view)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeView {
        properties: HashSet<String>,
        active: HashSet<String>,
        profile: String,
    }

    impl ConditionView for FakeView {
        fn has_property(&self, key: &str) -> bool {
            self.properties.contains(key)
        }
        fn property(&self, key: &str) -> Option<String> {
            self.properties.contains(key).then(|| key.to_string())
        }
        fn has_active_bean(&self, selector: &Selector) -> bool {
            match selector {
                Selector::ByName(name) => self.active.contains(name),
                Selector::ByType(_, name) => self.active.contains(*name),
            }
        }
        fn active_bean_count(&self, selector: &Selector) -> usize {
            usize::from(self.has_active_bean(selector))
        }
        fn active_profile(&self, name: &str) -> bool {
            self.profile == name
        }
    }

    #[test]
    fn on_property_and_missing_property() {
        let view = FakeView {
            properties: ["a".to_string()].into_iter().collect(),
            active: HashSet::new(),
            profile: "dev".to_string(),
        };
        assert!(Condition::OnProperty("a".to_string()).evaluate(&view).unwrap());
        assert!(!Condition::OnProperty("b".to_string()).evaluate(&view).unwrap());
        assert!(Condition::OnMissingProperty("b".to_string()).evaluate(&view).unwrap());
    }

    #[test]
    fn and_or_not_compose() {
        let view = FakeView {
            properties: ["a".to_string()].into_iter().collect(),
            active: HashSet::new(),
            profile: "dev".to_string(),
        };
        let cond = Condition::And(vec![
            Condition::OnProperty("a".to_string()),
            Condition::Not(Box::new(Condition::OnProperty("b".to_string()))),
        ]);
        assert!(cond.evaluate(&view).unwrap());

        let cond2 = Condition::Or(vec![
            Condition::OnProperty("missing".to_string()),
            Condition::OnProfile("dev".to_string()),
        ]);
        assert!(cond2.evaluate(&view).unwrap());
    }

    #[test]
    fn expression_condition_is_unimplemented() {
        let view = FakeView {
            properties: HashSet::new(),
            active: HashSet::new(),
            profile: "dev".to_string(),
        };
        let err = Condition::OnExpression("1==1".to_string()).evaluate(&view).unwrap_err();
        assert!(err.to_string().contains("not implemented"));
    }
}
