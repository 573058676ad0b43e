#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The step-driven valuation wizard.
//!
//! [`Wizard`] is an explicit state machine over [`Step`]. Every transition
//! is checked against the step's transition table and the target step's
//! guard, then the target's outputs are recomputed and stored in the
//! typed [`Session`]. Charts are handed to a [`ChartRenderer`] as soon as
//! their step produces them.

pub mod session;
pub mod step;

use avm_analysis::{AnalysisConfig, AnalysisError, LocalityFrame, charts};
use avm_analysis_models::{ChartKind, ChartSpec, ChartStore, RenderedChart};
use avm_catastro::DatasetStore;
use avm_report::ReportError;
use strum_macros::{AsRefStr, Display};

pub use session::{ComparisonOutputs, LocalitySelection, Session, SpatialOutputs};
pub use step::Step;

/// Turns chart specifications into stored artifacts.
pub trait ChartRenderer {
    type Error: std::error::Error;

    /// Renders one chart.
    ///
    /// # Errors
    ///
    /// Returns the renderer's error if the chart cannot be produced.
    fn render(&self, spec: &ChartSpec) -> Result<RenderedChart, Self::Error>;
}

/// What a step needs from earlier steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum Requirement {
    #[strum(serialize = "loaded datasets")]
    Datasets,
    #[strum(serialize = "a confirmed locality")]
    Locality,
    #[strum(serialize = "a selected block")]
    Block,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step needs {required}; go back to {fallback}")]
    MissingSelection {
        required: Requirement,
        fallback: Step,
    },

    #[error("Cannot go from {from} to {to}")]
    IllegalTransition { from: Step, to: Step },

    #[error("Action belongs to step {expected}, but the wizard is at {actual}")]
    WrongStep { expected: Step, actual: Step },

    #[error("Datasets are not loaded")]
    NotLoaded,

    #[error("No locality contains ({lng}, {lat})")]
    NoLocalityAt { lng: f64, lat: f64 },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Failed to render {kind} chart: {message}")]
    Render {
        kind: ChartKind,
        message: String,
    },

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// The wizard: current step, loaded data and the session built so far.
pub struct Wizard<R> {
    config: AnalysisConfig,
    renderer: R,
    store: Option<DatasetStore>,
    frame: Option<LocalityFrame>,
    session: Session,
    step: Step,
}

impl<R: ChartRenderer> Wizard<R> {
    #[must_use]
    pub fn new(config: AnalysisConfig, renderer: R) -> Self {
        Self {
            config,
            renderer,
            store: None,
            frame: None,
            session: Session::default(),
            step: Step::Loading,
        }
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn store(&self) -> Option<&DatasetStore> {
        self.store.as_ref()
    }

    /// The frame of the confirmed locality.
    #[must_use]
    pub const fn frame(&self) -> Option<&LocalityFrame> {
        self.frame.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Installs the loaded datasets and moves to locality selection.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::WrongStep`] outside the loading step.
    pub fn load(&mut self, store: DatasetStore) -> Result<(), WizardError> {
        self.expect_step(Step::Loading)?;
        self.store = Some(store);
        self.go_to(Step::SelectLocality)
    }

    /// Selects a locality by display name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::WrongStep`] outside locality selection and
    /// [`AnalysisError::UnknownLocality`] if no locality has that name.
    pub fn select_locality(&mut self, name: &str) -> Result<&LocalitySelection, WizardError> {
        self.expect_step(Step::SelectLocality)?;
        let store = self.store.as_ref().ok_or(WizardError::NotLoaded)?;
        let locality = store
            .locality_by_name(name)
            .ok_or_else(|| AnalysisError::UnknownLocality(name.to_string()))?;
        let selection = LocalitySelection {
            id: locality.id.clone(),
            name: locality.name.clone(),
        };
        Ok(self.set_locality(selection))
    }

    /// Selects the locality containing a clicked coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::NoLocalityAt`] if the point falls outside
    /// every locality.
    pub fn select_locality_at(
        &mut self,
        lng: f64,
        lat: f64,
    ) -> Result<&LocalitySelection, WizardError> {
        self.expect_step(Step::SelectLocality)?;
        let store = self.store.as_ref().ok_or(WizardError::NotLoaded)?;
        let locality = store
            .locality_at(lng, lat)
            .ok_or(WizardError::NoLocalityAt { lng, lat })?;
        let selection = LocalitySelection {
            id: locality.id.clone(),
            name: locality.name.clone(),
        };
        Ok(self.set_locality(selection))
    }

    fn set_locality(&mut self, selection: LocalitySelection) -> &LocalitySelection {
        if self.session.locality.as_ref() != Some(&selection) {
            log::info!("Selected locality {} ({})", selection.name, selection.id);
            self.frame = None;
            self.session.clear_locality_outputs();
        }
        self.session.locality.insert(selection)
    }

    /// Builds the locality frame and moves to block selection.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::MissingSelection`] if no locality is
    /// selected, or the frame's [`AnalysisError`].
    pub fn confirm_locality(&mut self) -> Result<(), WizardError> {
        self.expect_step(Step::SelectLocality)?;
        let store = self.store.as_ref().ok_or(WizardError::NotLoaded)?;
        let selection = self
            .session
            .locality
            .as_ref()
            .ok_or(WizardError::MissingSelection {
                required: Requirement::Locality,
                fallback: Step::SelectLocality,
            })?;

        let frame = LocalityFrame::build(store, &selection.id, &self.config)?;
        self.frame = Some(frame);
        self.go_to(Step::SelectBlock)
    }

    /// Selects a block of the confirmed locality.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::WrongStep`] outside block selection and
    /// [`AnalysisError::UnknownBlock`] if the block is not in the locality.
    pub fn select_block(&mut self, block_id: &str) -> Result<&str, WizardError> {
        self.expect_step(Step::SelectBlock)?;
        let frame = self.frame.as_ref().ok_or(WizardError::MissingSelection {
            required: Requirement::Locality,
            fallback: Step::SelectLocality,
        })?;
        let id = frame
            .block(block_id)
            .ok_or_else(|| AnalysisError::UnknownBlock(block_id.trim().to_string()))?
            .id
            .clone();

        if self.session.block_id.as_deref() != Some(id.as_str()) {
            log::info!("Selected block {id}");
            self.session.clear_block_outputs();
        }
        Ok(self.session.block_id.insert(id))
    }

    /// Moves to the next step in wizard order.
    ///
    /// # Errors
    ///
    /// Same as [`Self::go_to`]; at the last step this is an illegal
    /// transition.
    pub fn advance(&mut self) -> Result<Step, WizardError> {
        let target = self.step.next().ok_or(WizardError::IllegalTransition {
            from: self.step,
            to: self.step,
        })?;
        self.go_to(target)?;
        Ok(target)
    }

    /// Transitions to `target`, running its guard and recomputing its
    /// outputs.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::IllegalTransition`] for edges missing from
    /// the transition table and [`WizardError::MissingSelection`] when the
    /// target's guard fails. The current step is unchanged on error.
    pub fn go_to(&mut self, target: Step) -> Result<(), WizardError> {
        if !self.step.can_go_to(target) {
            return Err(WizardError::IllegalTransition {
                from: self.step,
                to: target,
            });
        }
        self.check_guard(target)?;
        self.enter(target)?;

        log::info!("Wizard step {} -> {}", self.step, target);
        self.step = target;
        Ok(())
    }

    /// Discards everything and returns to the loading step.
    pub fn reset(&mut self) {
        log::info!("Wizard reset from {}", self.step);
        self.store = None;
        self.frame = None;
        self.session = Session::default();
        self.step = Step::Loading;
    }

    fn expect_step(&self, expected: Step) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    fn check_guard(&self, target: Step) -> Result<(), WizardError> {
        match target {
            Step::Loading => Ok(()),
            Step::SelectLocality => self.require_store().map(|_| ()),
            Step::SelectBlock => self.require_frame().map(|_| ()),
            Step::SpatialContext | Step::Comparison | Step::Security | Step::Report => {
                self.require_block().map(|_| ())
            }
        }
    }

    fn require_store(&self) -> Result<&DatasetStore, WizardError> {
        self.store.as_ref().ok_or(WizardError::MissingSelection {
            required: Requirement::Datasets,
            fallback: Step::Loading,
        })
    }

    fn require_frame(&self) -> Result<&LocalityFrame, WizardError> {
        self.require_store()?;
        let missing = WizardError::MissingSelection {
            required: Requirement::Locality,
            fallback: Step::SelectLocality,
        };
        let (Some(frame), Some(selection)) = (&self.frame, &self.session.locality) else {
            return Err(missing);
        };
        if frame.locality().id == selection.id {
            Ok(frame)
        } else {
            Err(missing)
        }
    }

    fn require_block(&self) -> Result<(&LocalityFrame, usize), WizardError> {
        let frame = self.require_frame()?;
        self.session
            .block_id
            .as_deref()
            .and_then(|id| frame.slot(id))
            .map(|slot| (frame, slot))
            .ok_or(WizardError::MissingSelection {
                required: Requirement::Block,
                fallback: Step::SelectBlock,
            })
    }

    fn enter(&mut self, target: Step) -> Result<(), WizardError> {
        let Self {
            config,
            renderer,
            store,
            frame,
            session,
            ..
        } = self;

        match target {
            Step::Loading => {
                *store = None;
                *frame = None;
                *session = Session::default();
            }
            Step::SelectLocality => {}
            Step::SelectBlock => {
                let (Some(frame), Some(_)) = (frame.as_ref(), store.as_ref()) else {
                    return Ok(());
                };
                render(renderer, &mut session.charts, &charts::locality_map(frame))?;
            }
            Step::SpatialContext | Step::Comparison | Step::Security | Step::Report => {
                let (Some(store), Some(frame), Some(block_id)) =
                    (store.as_ref(), frame.as_ref(), session.block_id.clone())
                else {
                    return Ok(());
                };
                let Some(slot) = frame.slot(&block_id) else {
                    return Ok(());
                };
                enter_analysis_step(target, config, renderer, store, frame, slot, session)?;
            }
        }
        Ok(())
    }
}

fn render<R: ChartRenderer>(
    renderer: &R,
    charts: &mut ChartStore,
    spec: &ChartSpec,
) -> Result<(), WizardError> {
    let rendered = renderer.render(spec).map_err(|e| WizardError::Render {
        kind: spec.kind,
        message: e.to_string(),
    })?;
    log::debug!("Rendered {} chart", spec.kind);
    charts.insert(spec.kind, rendered);
    Ok(())
}

/// Recomputes and renders the outputs of a block-level step.
///
/// Charts are rendered into a staging store first. The session is only
/// touched once every chart of the step has rendered, so a failed render
/// leaves the previous outputs and charts in place.
fn enter_analysis_step<R: ChartRenderer>(
    target: Step,
    config: &AnalysisConfig,
    renderer: &R,
    store: &DatasetStore,
    frame: &LocalityFrame,
    slot: usize,
    session: &mut Session,
) -> Result<(), WizardError> {
    let block_id = frame.blocks()[slot].id.clone();
    let mut staged = ChartStore::new();

    match target {
        Step::SpatialContext => {
            let outputs = SpatialOutputs {
                centroid: avm_analysis::centroid(frame, slot),
                transit: avm_analysis::transit_context(store, frame, slot, config.transit_radius_m),
                schools: avm_analysis::school_context(store, frame, slot, config.school_radius_m),
            };
            render(renderer, &mut staged, &charts::block_map(frame, slot))?;
            render(
                renderer,
                &mut staged,
                &charts::transit_chart(frame, slot, &outputs.transit),
            )?;
            render(
                renderer,
                &mut staged,
                &charts::school_chart(frame, slot, &outputs.schools),
            )?;
            session.charts.merge(staged);
            session.spatial = Some(outputs);
        }
        Step::Comparison => {
            let outputs = ComparisonOutputs {
                comparison: avm_analysis::price_comparison(frame, slot, config.price_radius_m),
                usage_mix: avm_analysis::usage_mix(frame, slot, config.usage_radius_m),
                projection: avm_analysis::projection_series(&frame.blocks()[slot]),
            };
            render(
                renderer,
                &mut staged,
                &charts::value_comparison_chart(&outputs.comparison),
            )?;
            let usage = charts::usage_mix_chart(frame, &block_id, &outputs.usage_mix);
            if let Some(spec) = &usage {
                render(renderer, &mut staged, spec)?;
            }
            let projection = charts::projection_chart(&block_id, &outputs.projection);
            if let Some(spec) = &projection {
                render(renderer, &mut staged, spec)?;
            }

            if usage.is_none() {
                session.charts.remove(ChartKind::UsageMix);
            }
            if projection.is_none() {
                session.charts.remove(ChartKind::Projection);
            }
            session.charts.merge(staged);
            session.comparison = Some(outputs);
        }
        Step::Security => {
            let security = avm_analysis::security_context(store, &frame.locality().id);
            render(renderer, &mut staged, &charts::security_chart(&security))?;
            session.charts.merge(staged);
            session.security = Some(security);
        }
        Step::Report => {
            let result = avm_analysis::analyze(store, frame, &block_id, config)?;
            for spec in charts::all_charts(frame, &result) {
                render(renderer, &mut staged, &spec)?;
            }
            let report = avm_report::assemble(&result, &staged)?;
            session.charts = staged;
            session.result = Some(result);
            session.report = Some(report);
        }
        Step::Loading | Step::SelectLocality | Step::SelectBlock => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use avm_catastro::Collections;
    use avm_catastro_models::{Block, Locality, ZoningArea};
    use geo::{MultiPolygon, polygon};
    use std::cell::Cell;

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]])
    }

    fn block(id: &str, locality_id: &str, x: f64) -> Block {
        Block {
            id: id.to_string(),
            locality_id: locality_id.to_string(),
            area_id: Some("7".to_string()),
            geometry: square(x, 4.6, 0.0001),
            stratum: Some(3),
            value_m2: Some(2_000_000.0),
            projected: [Some(2_100_000.0), Some(2_200_000.0), None, None],
            transit_access_id: None,
            school_access_id: None,
            nearby_schools: 1,
            nearby_stations: 0,
            profitability: Some("Media".to_string()),
        }
    }

    fn store() -> DatasetStore {
        DatasetStore::new(Collections {
            localities: vec![
                Locality {
                    id: "1".to_string(),
                    name: "USAQUEN".to_string(),
                    boundary: square(-74.2, 4.5, 0.2),
                    crime_count: 300,
                    risk_level: "Alto".to_string(),
                },
                Locality {
                    id: "2".to_string(),
                    name: "SUBA".to_string(),
                    boundary: square(-74.0, 4.5, 0.2),
                    crime_count: 100,
                    risk_level: "Bajo".to_string(),
                },
            ],
            zoning_areas: vec![ZoningArea {
                id: "7".to_string(),
                locality_id: "1".to_string(),
                boundary: square(-74.2, 4.5, 0.2),
                land_use: Some("Residencial".to_string()),
                pot_area: None,
            }],
            blocks: vec![
                block("a", "1", -74.1),
                block("b", "1", -74.0999),
                block("z", "2", -73.9),
            ],
            transit: vec![],
            schools: vec![],
        })
        .unwrap()
    }

    #[derive(Default)]
    struct CountingRenderer {
        rendered: Cell<usize>,
    }

    impl ChartRenderer for CountingRenderer {
        type Error = std::convert::Infallible;

        fn render(&self, spec: &ChartSpec) -> Result<RenderedChart, Self::Error> {
            self.rendered.set(self.rendered.get() + 1);
            Ok(RenderedChart {
                media_type: "text/plain".to_string(),
                location: None,
                bytes: spec.title.as_bytes().to_vec(),
            })
        }
    }

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        type Error = std::io::Error;

        fn render(&self, _spec: &ChartSpec) -> Result<RenderedChart, Self::Error> {
            Err(std::io::Error::other("disk full"))
        }
    }

    /// Renders `budget` charts successfully, then fails every call.
    struct BudgetRenderer {
        budget: Cell<usize>,
    }

    impl ChartRenderer for BudgetRenderer {
        type Error = std::io::Error;

        fn render(&self, spec: &ChartSpec) -> Result<RenderedChart, Self::Error> {
            match self.budget.get() {
                0 => Err(std::io::Error::other("disk full")),
                n => {
                    self.budget.set(n - 1);
                    Ok(RenderedChart {
                        media_type: "text/plain".to_string(),
                        location: None,
                        bytes: spec.title.as_bytes().to_vec(),
                    })
                }
            }
        }
    }

    fn wizard() -> Wizard<CountingRenderer> {
        let mut wizard = Wizard::new(AnalysisConfig::default(), CountingRenderer::default());
        wizard.load(store()).unwrap();
        wizard
    }

    #[test]
    fn walks_every_step_to_the_report() {
        let mut wizard = wizard();
        assert_eq!(wizard.step(), Step::SelectLocality);

        wizard.select_locality("usaquen").unwrap();
        wizard.confirm_locality().unwrap();
        assert_eq!(wizard.step(), Step::SelectBlock);
        assert!(wizard.session().charts.contains(ChartKind::LocalityMap));

        wizard.select_block("a").unwrap();
        assert_eq!(wizard.advance().unwrap(), Step::SpatialContext);
        assert!(wizard.session().spatial.is_some());
        assert_eq!(wizard.advance().unwrap(), Step::Comparison);
        assert!(!wizard.session().charts.contains(ChartKind::Projection));
        assert_eq!(wizard.advance().unwrap(), Step::Security);
        assert_eq!(wizard.advance().unwrap(), Step::Report);

        let session = wizard.session();
        let report = session.report.as_ref().unwrap();
        assert_eq!(report.summary.block_id, "a");
        assert_eq!(report.charts.len(), ChartKind::all().len() - 1);
        assert!(matches!(
            wizard.advance(),
            Err(WizardError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn cannot_enter_spatial_context_without_block() {
        let mut wizard = wizard();
        wizard.select_locality("USAQUEN").unwrap();
        wizard.confirm_locality().unwrap();

        let err = wizard.go_to(Step::SpatialContext).unwrap_err();
        assert!(matches!(
            err,
            WizardError::MissingSelection {
                required: Requirement::Block,
                fallback: Step::SelectBlock,
            }
        ));
        assert_eq!(wizard.step(), Step::SelectBlock);
    }

    #[test]
    fn rejects_illegal_edges() {
        let mut wizard = wizard();
        assert!(matches!(
            wizard.go_to(Step::Report),
            Err(WizardError::IllegalTransition {
                from: Step::SelectLocality,
                to: Step::Report,
            })
        ));
    }

    #[test]
    fn selection_by_point_uses_locality_boundaries() {
        let mut wizard = wizard();
        let selected = wizard.select_locality_at(-73.95, 4.6).unwrap();
        assert_eq!(selected.name, "SUBA");
        assert!(matches!(
            wizard.select_locality_at(10.0, 10.0),
            Err(WizardError::NoLocalityAt { .. })
        ));
    }

    #[test]
    fn block_must_belong_to_confirmed_locality() {
        let mut wizard = wizard();
        wizard.select_locality("USAQUEN").unwrap();
        wizard.confirm_locality().unwrap();
        assert!(matches!(
            wizard.select_block("z"),
            Err(WizardError::Analysis(AnalysisError::UnknownBlock(_)))
        ));
    }

    #[test]
    fn confirming_requires_a_selection() {
        let mut wizard = wizard();
        assert!(matches!(
            wizard.confirm_locality(),
            Err(WizardError::MissingSelection {
                required: Requirement::Locality,
                ..
            })
        ));
    }

    #[test]
    fn reentering_a_step_recomputes_it() {
        let mut wizard = wizard();
        wizard.select_locality("USAQUEN").unwrap();
        wizard.confirm_locality().unwrap();
        wizard.select_block("a").unwrap();
        wizard.advance().unwrap();
        wizard.advance().unwrap();

        let before = wizard.renderer.rendered.get();
        wizard.go_to(Step::SpatialContext).unwrap();
        assert_eq!(wizard.renderer.rendered.get(), before + 3);
    }

    #[test]
    fn changing_locality_drops_block_outputs() {
        let mut wizard = wizard();
        wizard.select_locality("USAQUEN").unwrap();
        wizard.confirm_locality().unwrap();
        wizard.select_block("a").unwrap();
        wizard.advance().unwrap();

        wizard.go_to(Step::SelectBlock).unwrap();
        wizard.go_to(Step::SelectLocality).unwrap();
        wizard.select_locality("SUBA").unwrap();

        let session = wizard.session();
        assert!(session.block_id.is_none());
        assert!(session.spatial.is_none());
        assert!(session.charts.is_empty());
        assert!(wizard.frame().is_none());
        assert!(matches!(
            wizard.go_to(Step::SelectBlock),
            Err(WizardError::MissingSelection { .. })
        ));
    }

    #[test]
    fn reset_discards_everything() {
        let mut wizard = wizard();
        wizard.select_locality("USAQUEN").unwrap();
        wizard.reset();

        assert_eq!(wizard.step(), Step::Loading);
        assert!(wizard.store().is_none());
        assert_eq!(wizard.session(), &Session::default());
    }

    #[test]
    fn render_failures_surface_with_chart_kind() {
        let mut wizard = Wizard::new(AnalysisConfig::default(), FailingRenderer);
        wizard.load(store()).unwrap();
        wizard.select_locality("USAQUEN").unwrap();

        let err = wizard.confirm_locality().unwrap_err();
        assert!(matches!(
            err,
            WizardError::Render {
                kind: ChartKind::LocalityMap,
                ..
            }
        ));
        assert_eq!(wizard.step(), Step::SelectLocality);
    }

    #[test]
    fn failed_report_render_keeps_earlier_charts() {
        let renderer = BudgetRenderer {
            budget: Cell::new(usize::MAX),
        };
        let mut wizard = Wizard::new(AnalysisConfig::default(), renderer);
        wizard.load(store()).unwrap();
        wizard.select_locality("USAQUEN").unwrap();
        wizard.confirm_locality().unwrap();
        wizard.select_block("a").unwrap();
        while wizard.step() != Step::Security {
            wizard.advance().unwrap();
        }
        let before = wizard.session().clone();

        wizard.renderer.budget.set(2);
        let err = wizard.advance().unwrap_err();
        assert!(matches!(
            err,
            WizardError::Render {
                kind: ChartKind::TransitContext,
                ..
            }
        ));
        assert_eq!(wizard.step(), Step::Security);
        assert_eq!(wizard.session(), &before);
        assert!(wizard.session().charts.contains(ChartKind::Security));
        assert!(wizard.session().report.is_none());
    }

    #[test]
    fn failed_step_render_keeps_previous_outputs() {
        let renderer = BudgetRenderer {
            budget: Cell::new(usize::MAX),
        };
        let mut wizard = Wizard::new(AnalysisConfig::default(), renderer);
        wizard.load(store()).unwrap();
        wizard.select_locality("USAQUEN").unwrap();
        wizard.confirm_locality().unwrap();
        wizard.select_block("a").unwrap();
        wizard.advance().unwrap();
        wizard.advance().unwrap();
        let before = wizard.session().clone();

        wizard.renderer.budget.set(1);
        assert!(wizard.go_to(Step::SpatialContext).is_err());
        assert_eq!(wizard.step(), Step::Comparison);
        assert_eq!(wizard.session(), &before);
    }
}
