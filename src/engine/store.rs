use std::collections::HashMap;

use super::{matching::Profile, types::Sample};

/// A recorded reference motion. Immutable once built.
#[derive(Clone, Debug)]
pub struct GestureTemplate {
    name: String,
    samples: Vec<Sample>,
    profile: Profile,
}

impl GestureTemplate {
    pub fn new(name: String, samples: Vec<Sample>, resample_points: usize) -> Self {
        let profile = Profile::resample(&samples, resample_points);
        Self {
            name,
            samples,
            profile,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn span_ms(&self) -> u64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.t_ms - first.t_ms,
            _ => 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GestureStore {
    templates: HashMap<String, GestureTemplate>,
}

impl GestureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; returns the template this one replaced.
    pub fn insert(&mut self, template: GestureTemplate) -> Option<GestureTemplate> {
        self.templates.insert(template.name.clone(), template)
    }

    pub fn get(&self, name: &str) -> Option<&GestureTemplate> {
        self.templates.get(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GestureTemplate> {
        self.templates.values()
    }

    /// Template names in lexical order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(scale: f64) -> Vec<Sample> {
        (0..8u64)
            .map(|i| Sample::new((0.0, 0.0, 0.0), (i as f64 * scale, 0.0, 1.0), i * 20))
            .collect()
    }

    #[test]
    fn rerecording_replaces_without_growing() {
        let mut store = GestureStore::new();
        assert!(store.insert(GestureTemplate::new("swipe".into(), trace(1.0), 8)).is_none());
        assert!(store.insert(GestureTemplate::new("shake".into(), trace(2.0), 8)).is_none());

        let replaced = store
            .insert(GestureTemplate::new("swipe".into(), trace(3.0), 8))
            .expect("previous swipe returned");
        assert_eq!(replaced.samples()[1].accel.0, 1.0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("swipe").map(|t| t.samples()[1].accel.0), Some(3.0));
        assert_eq!(store.names(), vec!["shake".to_string(), "swipe".to_string()]);
    }

    #[test]
    fn template_profile_uses_configured_points() {
        let template = GestureTemplate::new("swipe".into(), trace(1.0), 5);
        assert_eq!(template.profile().points(), 5);
        assert_eq!(template.span_ms(), 140);
    }
}
