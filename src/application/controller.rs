// Dashboard refresh controller - owns the widgets and page, runs refresh cycles
use crate::application::binder::Binding;
use crate::application::clock::Clock;
use crate::application::dashboard_source::{DashboardSource, SourceResponse};
use crate::application::registry::WidgetRegistry;
use crate::application::variant::{AnnotationRule, Layout, Variant};
use crate::application::widget_factory::WidgetError;
use crate::domain::page::{BindingOutcome, Page};
use crate::domain::quiet_hours::{DimState, QuietHours, ScreenDimmer};
use crate::domain::widget::Widget;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Everything a viewer needs to draw the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub variant: Variant,
    pub revision: u64,
    pub dim_state: DimState,
    pub location: Option<String>,
    pub page: Page,
    pub widgets: WidgetRegistry,
}

struct DashboardState {
    registry: WidgetRegistry,
    page: Page,
    dimmer: ScreenDimmer,
    cycle: u64,
    /// Latest cycle that ended in a navigation
    navigated_cycle: Option<u64>,
}

impl DashboardState {
    fn apply(
        &mut self,
        cycle: u64,
        binding: Binding,
        response: SourceResponse,
        now: DateTime<Local>,
    ) {
        let endpoint = binding.endpoint();

        if self.navigated_cycle.is_some_and(|c| cycle <= c) {
            tracing::debug!(endpoint, cycle, "dropping response of a navigated cycle");
            return;
        }

        if let Some(location) = response.redirect {
            tracing::info!(endpoint, %location, "backend requested navigation");
            self.page.navigate(&location);
            self.navigated_cycle = Some(cycle);
            self.page
                .record(endpoint, BindingOutcome::Redirected { location }, now);
            return;
        }

        match binding.apply(response.body, &mut self.registry, &mut self.page, now) {
            Ok(()) => {
                if self.navigated_cycle.take().is_some() {
                    self.page.clear_navigation();
                }
                self.page.record(endpoint, BindingOutcome::Ok, now);
            }
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "binding failed, keeping stale data");
                self.page.record(
                    endpoint,
                    BindingOutcome::Failed {
                        reason: e.to_string(),
                    },
                    now,
                );
            }
        }
    }

    fn record_fetch_error(&mut self, endpoint: &str, error: &anyhow::Error, now: DateTime<Local>) {
        tracing::warn!(endpoint, error = %format!("{:#}", error), "fetch failed, keeping stale data");
        self.page.record(
            endpoint,
            BindingOutcome::Failed {
                reason: format!("{:#}", error),
            },
            now,
        );
    }
}

#[derive(Clone)]
pub struct DashboardController {
    variant: Variant,
    state: Arc<Mutex<DashboardState>>,
    source: Arc<dyn DashboardSource>,
    clock: Arc<dyn Clock>,
    bindings: Arc<Vec<Binding>>,
    annotations: Arc<Vec<AnnotationRule>>,
    revision: Arc<watch::Sender<u64>>,
}

impl DashboardController {
    /// Builds the page and every widget of `variant` in one pass.
    ///
    /// `quiet_hours` only takes effect when given; pass `None` to poll around
    /// the clock.
    pub fn new(
        variant: Variant,
        layout: Layout,
        quiet_hours: Option<QuietHours>,
        source: Arc<dyn DashboardSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WidgetError> {
        let page = Page::with_elements(layout.elements);
        let registry = WidgetRegistry::build(&layout.widgets, &page)?;
        tracing::info!(?variant, widgets = registry.len(), "dashboard widgets ready");

        let state = DashboardState {
            registry,
            page,
            dimmer: ScreenDimmer::new(quiet_hours),
            cycle: 0,
            navigated_cycle: None,
        };
        let (revision, _) = watch::channel(0);

        Ok(Self {
            variant,
            state: Arc::new(Mutex::new(state)),
            source,
            clock,
            bindings: Arc::new(layout.bindings),
            annotations: Arc::new(layout.annotations),
            revision: Arc::new(revision),
        })
    }

    /// Starts one refresh cycle.
    ///
    /// Returns the handles of the spawned requests; callers normally drop
    /// them, as requests of consecutive cycles may overlap.
    pub async fn tick(&self, force: bool) -> Vec<JoinHandle<()>> {
        let now = self.clock.now();
        let cycle = {
            let mut state = self.state.lock().await;
            let admitted = state.dimmer.admit(now.time(), force);
            if state.page.is_dimmed() == admitted {
                tracing::info!(dimmed = !admitted, "screen dim state changed");
            }
            state.page.set_dimmed(!admitted);
            if !admitted {
                drop(state);
                tracing::debug!(time = %now.time(), "quiet hours, skipping refresh");
                self.bump();
                return Vec::new();
            }

            for rule in self.annotations.iter() {
                if let Ok(widget) = state.registry.get_mut(rule.widget) {
                    widget.set_annotation(rule.anchor.position(now));
                }
            }
            state.cycle += 1;
            state.cycle
        };
        self.bump();
        tracing::debug!(cycle, force, "refresh cycle started");

        self.bindings
            .iter()
            .map(|binding| {
                let controller = self.clone();
                let binding = *binding;
                tokio::spawn(async move { controller.refresh(cycle, binding).await })
            })
            .collect()
    }

    async fn refresh(&self, cycle: u64, binding: Binding) {
        let result = self.source.fetch(binding.endpoint()).await;
        let now = self.clock.now();
        {
            let mut state = self.state.lock().await;
            match result {
                Ok(response) => state.apply(cycle, binding, response, now),
                Err(e) => state.record_fetch_error(binding.endpoint(), &e, now),
            }
        }
        self.bump();
    }

    /// Ends a manual undim period
    pub async fn end_undim(&self) {
        {
            let mut state = self.state.lock().await;
            state.dimmer.dim();
            let dimmed = state.dimmer.state() == DimState::Dimmed;
            state.page.set_dimmed(dimmed);
        }
        self.bump();
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.lock().await;
        DashboardSnapshot {
            variant: self.variant,
            revision: *self.revision.borrow(),
            dim_state: state.dimmer.state(),
            location: state.page.location().map(str::to_string),
            page: state.page.clone(),
            widgets: state.registry.clone(),
        }
    }

    pub async fn widget(&self, id: &str) -> Option<Widget> {
        self.state.lock().await.registry.get(id).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::binder::{
        CLOUD, LOAD, POLICY, PRODUCTION, REALTIME, SOC, TARIFFS_BUY, TEMP,
    };
    use crate::application::clock::testing::FixedClock;
    use crate::application::dashboard_source::testing::StubSource;
    use crate::domain::color::Color;
    use crate::domain::page::DIM_OVERLAY;
    use crate::infrastructure::http_source::HttpDashboardSource;
    use futures::future::join_all;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn controller(
        variant: Variant,
        quiet_hours: Option<QuietHours>,
        source: Arc<dyn DashboardSource>,
        clock: Arc<FixedClock>,
    ) -> DashboardController {
        DashboardController::new(variant, variant.layout(), quiet_hours, source, clock).unwrap()
    }

    fn night_window() -> Option<QuietHours> {
        Some(QuietHours::parse("06:00", "22:00").unwrap())
    }

    fn short_stub() -> Arc<StubSource> {
        let source = Arc::new(StubSource::default());
        source.respond(
            "/combined_realtime",
            json!([
                {"name": "kW", "data": [{"x": "Production", "y": 2.4}, {"x": "Load", "y": 0.8}]},
                {"name": "Policy", "data": [{"x": "SoC", "y": 64}, {"x": "Policy", "y": 5}]}
            ]),
        );
        source.respond("/tariffs_buy", json!([1.0, 3.0, 5.0]));
        source
    }

    async fn run_tick(controller: &DashboardController, force: bool) {
        for handle in join_all(controller.tick(force).await).await {
            handle.unwrap();
        }
    }

    #[tokio::test]
    async fn test_tariffs_end_to_end_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tariffs_buy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1.0, 3.0, 5.0])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/combined_realtime"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source =
            Arc::new(HttpDashboardSource::new(&server.uri(), None, Duration::from_secs(5)).unwrap());
        let clock = Arc::new(FixedClock::at(12, 0));
        let controller = controller(Variant::Short, None, source, clock);
        run_tick(&controller, false).await;

        let tariffs = controller.widget(TARIFFS_BUY).await.unwrap();
        assert_eq!(tariffs.series[0].values(), vec![Some(1.0), Some(3.0), Some(5.0)]);
        assert_eq!(
            tariffs.series[0].colors(),
            vec![Some(Color::Green), Some(Color::Amber), Some(Color::Red)]
        );

        let snapshot = controller.snapshot().await;
        assert_eq!(
            snapshot.page.status("/tariffs_buy").unwrap().outcome,
            BindingOutcome::Ok
        );
        assert!(matches!(
            snapshot.page.status("/combined_realtime").unwrap().outcome,
            BindingOutcome::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn test_quiet_hours_skip_fetch_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/small"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let source =
            Arc::new(HttpDashboardSource::new(&server.uri(), None, Duration::from_secs(5)).unwrap());
        let clock = Arc::new(FixedClock::at(23, 0));
        let controller = controller(Variant::Essential, night_window(), source, clock);

        assert!(controller.tick(false).await.is_empty());
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.dim_state, DimState::Dimmed);
        assert!(snapshot.page.is_dimmed());
        server.verify().await;
    }

    #[tokio::test]
    async fn test_quiet_hours_resume_in_the_morning() {
        let source = Arc::new(StubSource::default());
        let clock = Arc::new(FixedClock::at(23, 0));
        let controller = controller(
            Variant::Essential,
            night_window(),
            source.clone(),
            clock.clone(),
        );

        run_tick(&controller, false).await;
        assert_eq!(source.calls(), 0);

        clock.set(7, 0);
        run_tick(&controller, false).await;
        assert_eq!(source.calls(), 1);
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.dim_state, DimState::Active);
        assert!(!snapshot.page.element(DIM_OVERLAY).unwrap().visible);
    }

    #[tokio::test]
    async fn test_forced_tick_fetches_at_night() {
        let source = Arc::new(StubSource::default());
        let clock = Arc::new(FixedClock::at(23, 0));
        let controller = controller(Variant::Essential, night_window(), source.clone(), clock);

        run_tick(&controller, true).await;
        assert_eq!(source.calls(), 1);
        assert!(!controller.snapshot().await.page.is_dimmed());

        controller.end_undim().await;
        assert!(controller.snapshot().await.page.is_dimmed());
    }

    #[tokio::test]
    async fn test_redirect_navigates_without_updates() {
        let source = short_stub();
        source.redirect("/tariffs_buy", "/foo");
        let clock = Arc::new(FixedClock::at(12, 0));
        let controller = controller(Variant::Short, None, source, clock);

        run_tick(&controller, false).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.location.as_deref(), Some("/foo"));
        assert!(!snapshot.widgets.get(TARIFFS_BUY).unwrap().has_data());
        assert_eq!(
            snapshot.page.status("/tariffs_buy").unwrap().outcome,
            BindingOutcome::Redirected {
                location: "/foo".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_identical_payloads_are_idempotent() {
        let clock = Arc::new(FixedClock::at(12, 0));
        let controller = controller(Variant::Short, None, short_stub(), clock);

        run_tick(&controller, false).await;
        let first = controller.snapshot().await;
        run_tick(&controller, false).await;
        let second = controller.snapshot().await;

        assert_eq!(first.page, second.page);
        assert_eq!(first.widgets, second.widgets);
        assert!(second.revision > first.revision);
    }

    #[tokio::test]
    async fn test_legacy_annotations_follow_the_clock() {
        let clock = Arc::new(FixedClock::at(13, 47));
        let controller = controller(Variant::Short, None, short_stub(), clock.clone());

        run_tick(&controller, false).await;

        let tariffs = controller.widget(TARIFFS_BUY).await.unwrap();
        let expected = crate::domain::annotation::current_hour_millis(clock.now());
        assert_eq!(tariffs.annotation, Some(expected));
        assert!(controller.widget(TEMP).await.is_none());
    }

    fn combined_stub() -> Arc<StubSource> {
        let source = short_stub();
        source.respond(
            "/combined_production",
            json!([{"name": "Production", "data": [1.2, 0.8]}]),
        );
        source.respond("/combined_load", json!([{"name": "Load", "data": [0.5]}]));
        source.respond("/forecast_cloud", json!([0.1, 0.9]));
        source.respond("/forecast_temp", json!([3.5, 4.0]));
        source.respond("/policy", json!([15, 50, 85]));
        source
    }

    #[tokio::test]
    async fn test_combined_tick_fills_every_widget() {
        let source = combined_stub();
        let clock = Arc::new(FixedClock::at(13, 47));
        let controller = controller(Variant::Combined, None, source.clone(), clock.clone());

        run_tick(&controller, false).await;

        assert_eq!(source.calls(), 7);
        let snapshot = controller.snapshot().await;
        for binding in Variant::Combined.layout().bindings {
            assert_eq!(
                snapshot.page.status(binding.endpoint()).unwrap().outcome,
                BindingOutcome::Ok,
                "{}",
                binding.endpoint()
            );
        }
        for widget in [REALTIME, SOC, TARIFFS_BUY, PRODUCTION, LOAD, CLOUD, TEMP, POLICY] {
            assert!(snapshot.widgets.get(widget).unwrap().has_data(), "{}", widget);
        }
        assert_eq!(
            snapshot.widgets.get(POLICY).unwrap().series[0].colors(),
            vec![Some(Color::Red), Some(Color::Amber), Some(Color::Green)]
        );
        let now = clock.now();
        assert_eq!(
            snapshot.widgets.get(TARIFFS_BUY).unwrap().annotation,
            Some(crate::domain::annotation::current_hour_millis(now))
        );
        assert_eq!(
            snapshot.widgets.get(TEMP).unwrap().annotation,
            Some(crate::domain::annotation::wall_clock_millis(now))
        );
    }

    #[tokio::test]
    async fn test_quiet_hours_dim_layouts_without_small_dash() {
        let source = combined_stub();
        let clock = Arc::new(FixedClock::at(23, 0));
        let controller = controller(Variant::Combined, night_window(), source.clone(), clock);

        run_tick(&controller, false).await;

        assert_eq!(source.calls(), 0);
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.dim_state, DimState::Dimmed);
        assert!(snapshot.page.is_dimmed());
    }

    #[tokio::test]
    async fn test_legacy_small_path_is_fetched() {
        let source = Arc::new(StubSource::default());
        source.respond("/small_dash_data", json!({"version": "0.8.0", "tariffs_buy": [1.0]}));
        let layout = Variant::Essential.layout().with_legacy_small_path();
        let controller = DashboardController::new(
            Variant::Essential,
            layout,
            None,
            source.clone(),
            Arc::new(FixedClock::at(12, 0)),
        )
        .unwrap();

        run_tick(&controller, false).await;

        assert_eq!(source.calls(), 1);
        let snapshot = controller.snapshot().await;
        assert_eq!(
            snapshot.page.status("/small_dash_data").unwrap().outcome,
            BindingOutcome::Ok
        );
        assert_eq!(
            snapshot.page.element("version").unwrap().text.as_deref(),
            Some("Version: 0.8.0")
        );
        assert!(snapshot.widgets.get(TARIFFS_BUY).unwrap().has_data());
    }

    #[test]
    fn test_navigated_cycle_drops_late_responses() {
        let layout = Variant::Short.layout();
        let page = Page::with_elements(layout.elements.clone());
        let registry = WidgetRegistry::build(&layout.widgets, &page).unwrap();
        let mut state = DashboardState {
            registry,
            page,
            dimmer: ScreenDimmer::new(None),
            cycle: 0,
            navigated_cycle: None,
        };
        let now = Local::now();
        let redirect = SourceResponse {
            redirect: Some("/login?context=/".to_string()),
            body: serde_json::Value::Null,
        };
        let tariffs = SourceResponse {
            redirect: None,
            body: json!([1.0, 2.5]),
        };

        state.apply(1, Binding::CombinedRealtime, redirect, now);
        state.apply(1, Binding::TariffsBuy, tariffs.clone(), now);
        assert!(!state.registry.get(TARIFFS_BUY).unwrap().has_data());
        assert_eq!(state.page.location(), Some("/login?context=/"));

        state.apply(2, Binding::TariffsBuy, tariffs, now);
        assert!(state.registry.get(TARIFFS_BUY).unwrap().has_data());
        assert_eq!(state.page.location(), None);
    }

    #[test]
    fn test_missing_mount_aborts_construction() {
        let mut layout = Variant::Short.layout();
        layout.elements.retain(|id| *id != "soc");
        let result = DashboardController::new(
            Variant::Short,
            layout,
            None,
            Arc::new(StubSource::default()),
            Arc::new(FixedClock::at(12, 0)),
        );
        assert!(matches!(
            result,
            Err(WidgetError::MountPointMissing { .. })
        ));
    }
}
