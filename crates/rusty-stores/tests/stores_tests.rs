//! Integration tests for rusty-stores
//!
//! Tests wire several helpers together the way an application would:
//! - Config → location context → routed stores
//! - Query parameters persisted to storage
//! - Validated and merged form state
//! - Read-only and array views over shared stores

use pretty_assertions::assert_eq;
use rstest::rstest;
use rusty_router::make_router;
use rusty_stores::array::{filtered, mapped};
use rusty_stores::immutable::immutable;
use rusty_stores::location::{hash, pathname, query_param, LocationContext};
use rusty_stores::merge::merge;
use rusty_stores::route::{routed, routes, RoutedMatch};
use rusty_stores::storage::{persisted, MemoryStorage, Storage, StorageAreas};
use rusty_stores::validate::validated;
use rusty_stores::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Page {
    Home,
    Users,
    User,
    Settings,
}

fn app_routes() -> Vec<(&'static str, Page)> {
    vec![
        ("/", Page::Home),
        ("/users", Page::Users),
        ("/users/:id", Page::User),
        ("/settings", Page::Settings),
    ]
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn record<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |v: &T| sink.lock().unwrap().push(v.clone()))
}

// ============================================================================
// Config + Location + Routes
// ============================================================================

#[test]
fn test_config_drives_location_and_routes() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[location]\nhref = \"https://app.example.com/users/12?tab=posts\"").unwrap();

    let config = StoresConfig::load(file.path()).unwrap();
    let ctx = config.location_context().unwrap();
    let page = routes(app_routes(), pathname(&ctx)).unwrap();

    let current = page.get().unwrap();
    assert_eq!(current.value, Page::User);
    assert_eq!(current.params.get("id").map(String::as_str), Some("12"));

    ctx.navigate("/settings").unwrap();
    assert_eq!(page.get().map(|m| m.value), Some(Page::Settings));
}

#[rstest]
#[case("/", Some(Page::Home))]
#[case("/users", Some(Page::Users))]
#[case("/users/ada", Some(Page::User))]
#[case("/users/ada/../grace", Some(Page::User))]
#[case("/users/ada/posts", None)]
#[case("/nowhere", None)]
fn test_routed_pages(#[case] path: &str, #[case] expected: Option<Page>) {
    let ctx = LocationContext::new("http://localhost/").unwrap();
    let router = Arc::new(make_router(app_routes()).unwrap());
    let page = routed(router, pathname(&ctx));

    ctx.navigate(path).unwrap();
    assert_eq!(page.get().map(|m| m.value), expected);
}

#[test]
fn test_routed_store_notifies_on_navigation_only() {
    let ctx = LocationContext::new("http://localhost/users").unwrap();
    let page = routes(app_routes(), pathname(&ctx)).unwrap();
    let (seen, f) = record::<Option<Page>>();
    let _sub = page.subscribe(move |m: &Option<RoutedMatch<Page>>| f(&m.as_ref().map(|m| m.value)));

    ctx.navigate("/users/1").unwrap();
    ctx.navigate("/missing").unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some(Page::Users), Some(Page::User), None]
    );
}

#[test]
fn test_router_error_converts() {
    let compiler = rusty_router::RouteCompiler::new().with_size_limit(8);
    let err = rusty_router::Router::with_compiler([("/:a", 1)], &compiler).unwrap_err();
    let message = err.to_string();

    let err = StoreError::from(err);
    assert!(matches!(err, StoreError::Router(_)));
    assert_eq!(err.to_string(), message);
}

// ============================================================================
// Location + Storage
// ============================================================================

#[test]
fn test_query_param_persisted_across_sessions() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

    let ctx = LocationContext::new("http://localhost/search?q=rust").unwrap();
    let q = query_param(&ctx, "q");
    let last_search = Arc::new(persisted(storage.clone(), "last-search", String::new()));

    let sink = last_search.clone();
    let _sub = q.subscribe(move |q: &Option<String>| {
        if let Some(q) = q {
            sink.set(q.clone());
        }
    });

    ctx.navigate("/search?q=stores").unwrap();

    let restored = persisted(storage, "last-search", String::new());
    assert_eq!(restored.get(), "stores");
}

#[test]
fn test_config_prefix_and_area() {
    let config: StoresConfig =
        toml::from_str("[storage]\nkey_prefix = \"demo:\"\narea = \"local\"").unwrap();
    let areas = StorageAreas::in_memory();

    let theme = config.persisted(&areas, "theme", "light".to_string());
    theme.set("dark".to_string());

    assert_eq!(areas.local.get_item("demo:theme"), Some("\"dark\"".to_string()));
    assert_eq!(config.persisted(&areas, "theme", String::new()).get(), "dark");
}

#[test]
fn test_hash_and_path_are_independent() {
    let ctx = LocationContext::new("http://localhost/docs#intro").unwrap();
    let path = pathname(&ctx);
    let fragment = hash(&ctx);

    fragment.set("install".to_string());
    path.set("/guide".to_string());

    assert_eq!(ctx.href(), "http://localhost/guide#install");
}

// ============================================================================
// Validate + Merge
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Signup {
    email: String,
    age: u32,
}

fn check_signup(form: &Signup) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if !form.email.contains('@') {
        errors.push("email is invalid".to_string());
    }
    if form.age < 13 {
        errors.push("too young".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[test]
fn test_merge_updates_are_validated() {
    init_tracing();
    let form = Writable::new(Signup {
        email: String::new(),
        age: 10,
    });
    let checked = validated(StoreSource::writable(form.clone()), check_signup).unwrap();
    let edits = merge::<Signup>(form).unwrap();

    assert_eq!(checked.errors(), vec!["email is invalid", "too young"]);

    edits.merge(json!({"email": "ada@example.com"})).unwrap();
    assert_eq!(checked.errors(), vec!["too young"]);

    edits.merge(json!({"age": 36})).unwrap();
    assert!(checked.is_valid());
    assert_eq!(checked.get().email, "ada@example.com");
}

#[test]
fn test_failed_merge_keeps_validation_state() {
    let form = Writable::new(Signup {
        email: "a@b.c".to_string(),
        age: 20,
    });
    let checked = validated(StoreSource::writable(form.clone()), check_signup).unwrap();
    let edits = merge::<Signup>(form).unwrap();

    assert!(edits.merge(json!({"age": -1})).is_err());
    assert!(checked.is_valid());
    assert_eq!(checked.get().age, 20);
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_views_over_shared_list() {
    let todos = Writable::new(vec![
        ("write docs".to_string(), true),
        ("ship".to_string(), false),
    ]);

    let open = mapped(
        filtered(todos.clone(), |t: &(String, bool)| !t.1),
        |t: &(String, bool)| t.0.clone(),
    );
    let snapshot = immutable(todos.clone());

    assert_eq!(open.get(), vec!["ship"]);

    todos.update(|list| {
        let mut list = list.clone();
        list.push(("celebrate".to_string(), false));
        list
    });

    assert_eq!(open.get(), vec!["ship", "celebrate"]);
    assert_eq!(snapshot.get().len(), 3);
}

#[test]
fn test_readonly_source_cannot_be_merged() {
    let fixed = StoreSource::readable(readable(json!({"a": 1})));
    assert!(matches!(merge(fixed), Err(StoreError::ReadOnly)));
}
