//! End-to-end injection behavior against a page model.

use gtm_injector::{
    ConfigError, DataLayerEvent, GtmConfig, InstallError, InstallOutcome, LayerConsumer, Page,
    Route, TagInjector,
};
use serde_json::json;

mod common;

use common::{init, sample_config, SAMPLE_ID};

#[test]
fn test_malformed_container_ids_rejected() {
    for bad in ["", "KLQB72K", "GTM-", "GT-KLQB72K", "gtm-klqb72k", " GTM-KLQB72K"] {
        let result = TagInjector::initialize(GtmConfig::new(bad));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidContainerId(bad.to_string())
        );
    }
    // Nothing could have been installed without a handle.
    assert!(TagInjector::default().page().scripts().is_empty());
}

#[test]
fn test_reserved_variables_rejected() {
    let mut config = sample_config();
    config.initial_variables.insert("event".into(), json!("spoofed"));
    assert_eq!(
        TagInjector::initialize(config).unwrap_err(),
        ConfigError::ReservedVariable("event".into())
    );
}

#[test]
fn test_sample_config_end_to_end() {
    let handle = init(sample_config());
    let mut injector = TagInjector::default();

    assert_eq!(injector.install(&handle).unwrap(), InstallOutcome::Installed);

    let page = injector.page();
    assert_eq!(page.scripts().len(), 1);
    assert!(page.scripts()[0].is_deferred());
    assert_eq!(page.active_container().as_deref(), Some(SAMPLE_ID));

    let layer = page.layer("dataLayer").unwrap();
    let first = layer.first().unwrap();
    assert_eq!(first.get("test"), Some(&json!("1")));
    assert_eq!(first.event_name(), Some("gtm.js"));

    let head = page.render_head().unwrap();
    assert!(head.contains(r#"src="https://www.googletagmanager.com/gtm.js?id=GTM-KLQB72K" defer>"#));
    assert!(head.contains(r#""test":"1""#));
    assert!(page.render_body().contains("ns.html?id=GTM-KLQB72K"));
}

#[test]
fn test_install_is_idempotent() {
    let handle = init(sample_config());
    let mut injector = TagInjector::default();

    assert_eq!(injector.install(&handle).unwrap(), InstallOutcome::Installed);
    assert_eq!(injector.install(&handle).unwrap(), InstallOutcome::AlreadyInstalled);

    // A separately initialized handle for the same container is the same install.
    let twin = init(sample_config());
    assert_eq!(injector.install(&twin).unwrap(), InstallOutcome::AlreadyInstalled);

    assert_eq!(injector.page().scripts().len(), 1);
    assert_eq!(injector.page().noscripts().len(), 1);
}

#[test]
fn test_different_container_conflicts() {
    let first = init(sample_config());
    let second = init(GtmConfig::new("GTM-OTHER42"));
    let mut injector = TagInjector::default();
    injector.install(&first).unwrap();
    let before = injector.page().scripts().to_vec();

    assert_eq!(
        injector.install(&second).unwrap_err(),
        InstallError::AlreadyInstalledDifferentContainer {
            active: SAMPLE_ID.into(),
            requested: "GTM-OTHER42".into(),
        }
    );
    assert_eq!(injector.page().scripts(), before.as_slice());
}

#[test]
fn test_uninstall_then_install_other_container() {
    let first = init(sample_config());
    let second = init(GtmConfig::new("GTM-OTHER42"));
    let mut injector = TagInjector::default();
    injector.install(&first).unwrap();

    assert!(!injector.uninstall(&second));
    assert!(injector.uninstall(&first));
    assert!(injector.page().scripts().is_empty());
    assert!(injector.page().noscripts().is_empty());
    assert!(injector.page().layer("dataLayer").is_none());

    assert_eq!(injector.install(&second).unwrap(), InstallOutcome::Installed);
    assert_eq!(injector.page().active_container().as_deref(), Some("GTM-OTHER42"));
}

#[test]
fn test_page_tracking_disabled_never_appends() {
    let mut config = sample_config();
    config.enable_auto_page_tracking = false;
    let handle = init(config);
    let mut injector = TagInjector::default();
    injector.install(&handle).unwrap();

    for route in [Route::new("home", "/"), Route::unnamed("/a?b=c"), Route::new("x", "")] {
        injector.track_page_view(&handle, &route);
    }
    assert_eq!(handle.layer().len(), 1);
}

#[test]
fn test_page_tracking_one_event_per_route_change() {
    let handle = init(sample_config());
    let mut injector = TagInjector::default();
    injector.install(&handle).unwrap();

    let routes = [Route::new("home", "/"), Route::new("about", "/about"), Route::new("post", "/post/1")];
    for route in &routes {
        injector.track_page_view(&handle, route);
    }

    let views = handle.layer().since(1);
    assert_eq!(views.len(), routes.len());
    for (view, route) in views.iter().zip(&routes) {
        assert_eq!(view.event_name(), Some("nuxtRoute"));
        assert_eq!(view.get("pageType"), Some(&json!("PageView")));
        assert_eq!(view.get("routeName"), Some(&json!(route.name)));
        assert_eq!(view.get("path"), Some(&json!(route.path)));
    }
}

#[test]
fn test_custom_page_view_event_name() {
    let mut config = sample_config();
    config.page_view_event_name = "routeChange".into();
    let handle = init(config);

    TagInjector::default().track_page_view(&handle, &Route::new("home", "/"));
    assert_eq!(handle.layer().last().unwrap().event_name(), Some("routeChange"));
}

#[test]
fn test_push_before_and_after_install() {
    let handle = init(sample_config());
    let mut injector = TagInjector::default();

    injector.push(&handle, DataLayerEvent::named("before"));
    injector.install(&handle).unwrap();

    // The external script attaches after install and sees the backlog.
    let mut script = LayerConsumer::attach(injector.page().layer("dataLayer").unwrap());
    injector.push(&handle, DataLayerEvent::named("after"));

    let mut seen = script.drain();
    injector.push(&handle, DataLayerEvent::named("later"));
    seen.extend(script.drain());
    assert!(script.drain().is_empty());

    let names: Vec<_> = seen.iter().map(|e| e.event_name().unwrap()).collect();
    assert_eq!(names, ["gtm.js", "before", "after", "later"]);
}

#[test]
fn test_disabled_config_injects_nothing_but_records() {
    let mut config = sample_config();
    config.enabled = false;
    let handle = init(config);
    let mut injector = TagInjector::default();

    assert_eq!(injector.install(&handle).unwrap(), InstallOutcome::Disabled);
    injector.push(&handle, DataLayerEvent::named("kept"));

    assert!(injector.page().scripts().is_empty());
    assert!(injector.page().layer("dataLayer").is_none());
    assert_eq!(handle.layer().len(), 2);
}

#[test]
fn test_do_not_track() {
    let handle = init(sample_config());

    let mut respecting = TagInjector::new(Page::with_do_not_track(true));
    assert_eq!(respecting.install(&handle).unwrap(), InstallOutcome::DoNotTrack);
    assert!(respecting.page().scripts().is_empty());

    let mut config = sample_config();
    config.respect_do_not_track = false;
    let ignoring_handle = init(config);
    let mut ignoring = TagInjector::new(Page::with_do_not_track(true));
    assert_eq!(ignoring.install(&ignoring_handle).unwrap(), InstallOutcome::Installed);
}

#[test]
fn test_custom_layer_and_noscript_off() {
    let mut config = sample_config();
    config.layer_name = "test".into();
    config.noscript = false;
    config.defer_script_load = false;
    config.crossorigin = Some("anonymous".into());
    let handle = init(config);
    let mut injector = TagInjector::default();
    injector.install(&handle).unwrap();

    let page = injector.page();
    assert!(page.noscripts().is_empty());
    assert!(page.layer("test").is_some());
    assert!(page.layer("dataLayer").is_none());
    let head = page.render_head().unwrap();
    assert!(head.contains("window['test']=window['test']||[];"));
    assert!(head.contains(r#"gtm.js?id=GTM-KLQB72K&amp;l=test" async crossorigin="anonymous">"#));
}

#[test]
fn test_public_runtime_config() {
    let handle = init(sample_config());
    let public = TagInjector::public_runtime_config(&handle);
    assert_eq!(
        serde_json::to_value(&public).unwrap(),
        json!({
            "containerId": SAMPLE_ID,
            "layerName": "dataLayer",
            "pageTracking": true,
            "scriptUrl": "https://www.googletagmanager.com/gtm.js",
        })
    );
}

#[test]
fn test_second_handle_for_installed_container_feeds_page_layer() {
    let first = init(sample_config());
    let twin = init(sample_config());
    let mut injector = TagInjector::default();

    assert_eq!(injector.install(&first).unwrap(), InstallOutcome::Installed);
    let mut script = LayerConsumer::attach(injector.page().layer("dataLayer").unwrap());

    // Queued on the twin before it learns the container is already running.
    injector.push(&twin, DataLayerEvent::named("queued_on_twin"));
    assert_eq!(injector.install(&twin).unwrap(), InstallOutcome::AlreadyInstalled);
    injector.push(&twin, DataLayerEvent::named("from_twin"));
    injector.track_page_view(&twin, &Route::new("home", "/"));

    let seen = script.drain();
    let names: Vec<_> = seen.iter().filter_map(|e| e.event_name()).collect();
    assert_eq!(names, ["gtm.js", "queued_on_twin", "from_twin", "nuxtRoute"]);

    // The twin's own start event is not replayed; its variables are.
    assert_eq!(seen.iter().filter(|e| e.event_name() == Some("gtm.js")).count(), 1);
    assert_eq!(seen[1], DataLayerEvent::new().with("test", "1"));
    assert!(twin.layer().shares_log_with(&first.layer()));
}

#[test]
fn test_second_handle_with_other_layer_name_follows_installed_layer() {
    let first = init(sample_config());
    let mut renamed = sample_config();
    renamed.layer_name = "reloaded".into();
    let twin = init(renamed);
    let mut injector = TagInjector::default();

    injector.install(&first).unwrap();
    assert_eq!(injector.install(&twin).unwrap(), InstallOutcome::AlreadyInstalled);
    injector.push(&twin, DataLayerEvent::named("from_twin"));

    let page_layer = injector.page().layer("dataLayer").unwrap();
    assert_eq!(page_layer.last().unwrap().event_name(), Some("from_twin"));
    assert!(injector.page().layer("reloaded").is_none());
}

#[test]
fn test_uninstall_through_second_handle_detaches_layer() {
    let first = init(sample_config());
    let twin = init(sample_config());
    let other = init(GtmConfig::new("GTM-OTHER42"));
    let mut injector = TagInjector::default();

    injector.install(&first).unwrap();
    assert!(injector.uninstall(&twin));
    assert!(injector.page().layer("dataLayer").is_none());

    assert_eq!(injector.install(&other).unwrap(), InstallOutcome::Installed);
    injector.push(&other, DataLayerEvent::named("from_other"));
    let page_layer = injector.page().layer("dataLayer").unwrap();
    assert!(page_layer.shares_log_with(&other.layer()));
    assert_eq!(page_layer.last().unwrap().event_name(), Some("from_other"));
}
