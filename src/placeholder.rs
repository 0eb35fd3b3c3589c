//! Placeholder styles used when substituting rewritten references into markup.

use regex::{Captures, Regex};

/// Trait describing how a templating layer spells asset and route references.
pub trait PlaceholderStyle {
  /// Reference to a stored asset, e.g. `{% static 'site/img/a.png' %}`.
  fn asset_reference(&self, namespace: &str, name: &str) -> String;

  /// Reference to a named route, e.g. `{% url 'about' %}`.
  fn route_reference(&self, route: &str) -> String;
}

/// Default asset format, matching Django's `static` tag.
pub const DEFAULT_ASSET_FORMAT: &str = "{% static '{namespace}/{name}' %}";

/// Default route format, matching Django's `url` tag.
pub const DEFAULT_ROUTE_FORMAT: &str = "{% url '{route}' %}";

/// Placeholder style driven by format strings with named `{…}` slots.
///
/// The asset format understands `{namespace}` and `{name}`; the route format understands
/// `{route}`. Unknown slots are left verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePlaceholders {
  asset_format: String,
  route_format: String,
}

impl Default for TemplatePlaceholders {
  fn default() -> Self {
    Self::new(DEFAULT_ASSET_FORMAT, DEFAULT_ROUTE_FORMAT)
  }
}

impl TemplatePlaceholders {
  /// Build a style from explicit format strings.
  pub fn new(asset_format: impl Into<String>, route_format: impl Into<String>) -> Self {
    Self {
      asset_format: asset_format.into(),
      route_format: route_format.into(),
    }
  }
}

impl PlaceholderStyle for TemplatePlaceholders {
  fn asset_reference(&self, namespace: &str, name: &str) -> String {
    fill_named(&self.asset_format, &[("namespace", namespace), ("name", name)])
  }

  fn route_reference(&self, route: &str) -> String {
    fill_named(&self.route_format, &[("route", route)])
  }
}

/// Placeholder style backed by two closures.
pub struct PlaceholderFns<A, R> {
  asset: A,
  route: R,
}

impl<A, R> PlaceholderFns<A, R>
where
  A: Fn(&str, &str) -> String,
  R: Fn(&str) -> String,
{
  /// Wrap an asset closure `(namespace, name)` and a route closure `(route)`.
  pub fn new(asset: A, route: R) -> Self {
    Self { asset, route }
  }
}

impl<A, R> PlaceholderStyle for PlaceholderFns<A, R>
where
  A: Fn(&str, &str) -> String,
  R: Fn(&str) -> String,
{
  fn asset_reference(&self, namespace: &str, name: &str) -> String {
    (self.asset)(namespace, name)
  }

  fn route_reference(&self, route: &str) -> String {
    (self.route)(route)
  }
}

fn slot_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("invalid placeholder regex"))
}

/// Substitute `{key}` slots in a single pass so values are never re-expanded.
pub fn fill_named(format: &str, values: &[(&str, &str)]) -> String {
  slot_pattern()
    .replace_all(format, |caps: &Captures<'_>| {
      let key = &caps[1];
      match values.iter().find(|(name, _)| *name == key) {
        Some((_, value)) => (*value).to_string(),
        None => caps[0].to_string(),
      }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_style_emits_django_tags() {
    let style = TemplatePlaceholders::default();
    assert_eq!(
      style.asset_reference("portfolio", "css/main.css"),
      "{% static 'portfolio/css/main.css' %}"
    );
    assert_eq!(style.route_reference("about"), "{% url 'about' %}");
  }

  #[test]
  fn custom_formats_support_other_engines() {
    let style = TemplatePlaceholders::new("{{ asset('{namespace}/{name}') }}", "{{ route('{route}') }}");
    assert_eq!(
      style.asset_reference("app", "img/a.png"),
      "{{ asset('app/img/a.png') }}"
    );
    assert_eq!(style.route_reference("contact"), "{{ route('contact') }}");
  }

  #[test]
  fn closures_can_drive_placeholders() {
    let style = PlaceholderFns::new(
      |namespace: &str, name: &str| format!("/assets/{namespace}/{name}"),
      |route: &str| format!("/{route}/"),
    );
    assert_eq!(style.asset_reference("app", "a.js"), "/assets/app/a.js");
    assert_eq!(style.route_reference("blog"), "/blog/");
  }

  #[test]
  fn values_are_not_expanded_twice() {
    assert_eq!(
      fill_named("{name}-{route}", &[("name", "{route}"), ("route", "r")]),
      "{route}-r"
    );
    assert_eq!(fill_named("{unknown}", &[]), "{unknown}");
  }
}
