//! The palette session: a seed registry, its settings, and the derived chain
//! (projection, adjustment, construction) for each consumer.
//!
//! Every mutation goes through the session, which recomputes both consumers before
//! publishing anything. Readers and observers therefore never see one consumer
//! updated and the other stale. Stages whose inputs compare equal to the previous
//! run are reused as-is.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::adjust::{adjust, AdjustParams, AdjustedColor};
use crate::construct::{build_palette, ConstructParams};
use crate::cvd::Cvd;
use crate::projection::input_colors;
use crate::scale::Scale;
use crate::seeds::{Consumer, InitialSeeds, SeedColor, SeedId, SeedRegistry};
use crate::settings::{ChannelSettings, PaletteType, Settings};
use crate::{Error, Result};

/// How long an import flag stays raised.
pub const IMPORT_STATUS_DURATION: Duration = Duration::from_millis(1500);

/// Transient success/error flags for text imports.
///
/// Flags are read against a caller-supplied instant instead of being cleared by a
/// timer. Raising a flag again restarts its window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStatus {
    success_at: Option<Instant>,
    error_at: Option<Instant>,
}

impl ImportStatus {
    pub fn raise_success(&mut self, now: Instant) {
        self.success_at = Some(now);
    }

    pub fn raise_error(&mut self, now: Instant) {
        self.error_at = Some(now);
    }

    pub fn is_success(&self, now: Instant) -> bool {
        Self::is_raised(self.success_at, now)
    }

    pub fn is_error(&self, now: Instant) -> bool {
        Self::is_raised(self.error_at, now)
    }

    fn record<T>(&mut self, result: &Result<T>, now: Instant) {
        match result {
            Ok(_) => self.raise_success(now),
            Err(_) => self.raise_error(now),
        }
    }

    fn is_raised(raised_at: Option<Instant>, now: Instant) -> bool {
        raised_at
            .map(|at| now.saturating_duration_since(at) < IMPORT_STATUS_DURATION)
            .unwrap_or(false)
    }
}

/// Everything derived for one consumer by the latest recomputation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelOutput {
    pub input: Vec<SeedColor>,
    pub adjusted: Vec<AdjustedColor>,
    /// `None` when there is nothing to build a scale from.
    pub palette: Option<Scale>,
    /// The palette sampled into one hex color per class.
    pub colors: Vec<String>,
}

pub type Observer = Box<dyn FnMut(Consumer, &ChannelOutput)>;

#[derive(Debug, Clone, Default)]
struct Channel {
    adjust_params: Option<AdjustParams>,
    construct_params: Option<ConstructParams>,
    output: ChannelOutput,
}

pub struct Session {
    registry: SeedRegistry,
    settings: Settings,
    point: Channel,
    area: Channel,
    import_status: ImportStatus,
    observers: Vec<Observer>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .field("point", &self.point)
            .field("area", &self.area)
            .field("import_status", &self.import_status)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_registry(SeedRegistry::new(), Settings::default())
    }
}

impl Session {
    /// A session over the default single-seed registry.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::with_registry(SeedRegistry::new(), settings))
    }

    /// Like [`Session::new`], with deterministic random generation.
    pub fn with_seed(settings: Settings, seed: u64) -> Result<Self> {
        settings.validate()?;
        Ok(Self::with_registry(
            SeedRegistry::with_rng(StdRng::seed_from_u64(seed)),
            settings,
        ))
    }

    fn with_registry(registry: SeedRegistry, settings: Settings) -> Self {
        let mut session = Session {
            registry,
            settings,
            point: Channel::default(),
            area: Channel::default(),
            import_status: ImportStatus::default(),
            observers: vec![],
        };
        session.refresh();
        session
    }

    /// Registers a callback run after every recomputation that changed a consumer's
    /// output.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(Consumer, &ChannelOutput) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    // Reads

    pub fn registry(&self) -> &SeedRegistry {
        &self.registry
    }

    pub fn seeds(&self) -> Vec<SeedColor> {
        self.registry.seeds()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn output(&self, consumer: Consumer) -> &ChannelOutput {
        &self.channel(consumer).output
    }

    pub fn input_colors(&self, consumer: Consumer) -> &[SeedColor] {
        &self.output(consumer).input
    }

    pub fn adjusted_colors(&self, consumer: Consumer) -> &[AdjustedColor] {
        &self.output(consumer).adjusted
    }

    pub fn palette(&self, consumer: Consumer) -> Option<&Scale> {
        self.output(consumer).palette.as_ref()
    }

    pub fn palette_colors(&self, consumer: Consumer) -> &[String] {
        &self.output(consumer).colors
    }

    pub fn import_status(&self) -> &ImportStatus {
        &self.import_status
    }

    // Seed mutations

    pub fn generate(&mut self, count: usize, start_color: Option<&str>) -> Result<()> {
        let result = self.registry.generate(count, start_color);
        self.refresh();
        result
    }

    pub fn generate_random(&mut self, count: usize) -> Result<()> {
        let result = self.registry.generate_random(count);
        self.refresh();
        result
    }

    pub fn load<S: AsRef<str>>(&mut self, colors: &[S]) -> Result<()> {
        let result = self.registry.load(colors);
        self.refresh();
        result
    }

    pub fn load_from_text(&mut self, text: &str) -> Result<usize> {
        self.load_from_text_at(text, Instant::now())
    }

    /// Imports the hex colors in `text` and raises the matching import flag as of
    /// `now`.
    pub fn load_from_text_at(&mut self, text: &str, now: Instant) -> Result<usize> {
        let result = self.registry.load_from_text(text);
        match &result {
            Ok(count) => info!("Imported {} seed colors", count),
            Err(e) => info!("Import failed: {}", e),
        }
        self.import_status.record(&result, now);
        self.refresh();
        result
    }

    pub fn initialize(&mut self, source: &InitialSeeds) -> Result<()> {
        self.initialize_at(source, Instant::now())
    }

    pub fn initialize_at(&mut self, source: &InitialSeeds, now: Instant) -> Result<()> {
        let result = self.registry.initialize(source);
        if let InitialSeeds::Text(_) = source {
            match &result {
                Ok(()) => info!("Initialized {} seed colors from text", self.registry.len()),
                Err(e) => info!("Import failed: {}", e),
            }
            self.import_status.record(&result, now);
        }
        self.refresh();
        result
    }

    pub fn set_input_index(&mut self, id: SeedId, consumer: Consumer, position: Option<usize>) {
        self.registry.set_input_index(id, consumer, position);
        self.refresh();
    }

    pub fn rescale_hue(&mut self, new_min: f32, new_max: f32) -> Result<()> {
        let result = self.registry.rescale_hue(new_min, new_max);
        self.refresh();
        result
    }

    /// Rescales seed hues into the configured hue range.
    pub fn rescale_hue_to_settings(&mut self) -> Result<()> {
        let range = self.settings.hue_range;
        self.rescale_hue(range.min, range.max)
    }

    pub fn remove_from_input(&mut self, consumer: Consumer, id: SeedId) {
        self.registry.remove_from_input(consumer, id);
        self.refresh();
    }

    pub fn add_to_input_end(&mut self, consumer: Consumer, id: SeedId) {
        self.registry.add_to_input_end(consumer, id);
        self.refresh();
    }

    pub fn add_to_input_position(&mut self, consumer: Consumer, dragged: SeedId, target: SeedId) {
        self.registry.add_to_input_position(consumer, dragged, target);
        self.refresh();
    }

    // Parameter mutations

    /// Replaces all settings. Invalid settings are rejected and nothing changes.
    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.refresh();
        Ok(())
    }

    /// Edits one consumer's settings in place. If the edit leaves them invalid they
    /// are restored and the error returned.
    pub fn update_channel<F>(&mut self, consumer: Consumer, edit: F) -> Result<()>
    where
        F: FnOnce(&mut ChannelSettings),
    {
        let mut updated = *self.settings.channel(consumer);
        edit(&mut updated);
        updated
            .validate()
            .map_err(|e| Error::InvalidSettings(format!("{} settings: {}", consumer, e)))?;

        *self.settings.channel_mut(consumer) = updated;
        self.refresh();
        Ok(())
    }

    pub fn set_palette_type(&mut self, consumer: Consumer, palette_type: PaletteType) {
        self.set_channel(consumer, |c| c.palette_type = palette_type);
    }

    pub fn set_classes(&mut self, consumer: Consumer, classes: usize) -> Result<()> {
        self.update_channel(consumer, |c| c.classes = classes)
    }

    pub fn set_lightness_mid(&mut self, consumer: Consumer, mid: f32) -> Result<()> {
        self.update_channel(consumer, |c| c.lightness_mid = mid)
    }

    pub fn set_lightness_range(&mut self, consumer: Consumer, range: f32) -> Result<()> {
        self.update_channel(consumer, |c| c.lightness_range = range)
    }

    pub fn set_invert_lightness(&mut self, consumer: Consumer, invert: bool) {
        self.set_channel(consumer, |c| c.invert_lightness = invert);
    }

    pub fn set_lightness_correction(&mut self, consumer: Consumer, enabled: bool) {
        self.set_channel(consumer, |c| c.lightness_correction = enabled);
    }

    pub fn set_bezier_interpolation(&mut self, consumer: Consumer, enabled: bool) {
        self.set_channel(consumer, |c| c.bezier_interpolation = enabled);
    }

    pub fn set_cvd(&mut self, cvd: Cvd) {
        self.settings.cvd = cvd;
        self.refresh();
    }

    /// Edits that cannot invalidate the settings.
    fn set_channel<F>(&mut self, consumer: Consumer, edit: F)
    where
        F: FnOnce(&mut ChannelSettings),
    {
        edit(self.settings.channel_mut(consumer));
        self.refresh();
    }

    // Derivation

    fn channel(&self, consumer: Consumer) -> &Channel {
        match consumer {
            Consumer::Point => &self.point,
            Consumer::Area => &self.area,
        }
    }

    /// Recomputes both consumers, then publishes them together.
    fn refresh(&mut self) {
        let point = self.derive(Consumer::Point);
        let area = self.derive(Consumer::Area);

        let point_changed = point.output != self.point.output;
        let area_changed = area.output != self.area.output;
        self.point = point;
        self.area = area;

        for observer in self.observers.iter_mut() {
            if point_changed {
                observer(Consumer::Point, &self.point.output);
            }
            if area_changed {
                observer(Consumer::Area, &self.area.output);
            }
        }
    }

    fn derive(&self, consumer: Consumer) -> Channel {
        let previous = self.channel(consumer);
        let channel = self.settings.channel(consumer);

        let adjust_params = AdjustParams {
            palette_type: channel.palette_type,
            lightness_mid: channel.lightness_mid,
            lightness_range: channel.signed_lightness_range(),
            lightness_correction: channel.lightness_correction,
            cvd: self.settings.cvd,
        };
        let construct_params = ConstructParams {
            palette_type: channel.palette_type,
            classes: channel.classes,
            lightness_correction: channel.lightness_correction,
            bezier_interpolation: channel.bezier_interpolation,
        };

        let input = input_colors(&self.registry, consumer);

        let adjusted = if previous.adjust_params == Some(adjust_params)
            && previous.output.input == input
        {
            debug!("Reusing {} adjusted colors for {}", previous.output.adjusted.len(), consumer);
            previous.output.adjusted.clone()
        } else {
            match adjust(&input, &adjust_params) {
                Ok(adjusted) => adjusted,
                Err(e) => {
                    warn!("Could not adjust {} input colors: {}", consumer, e);
                    vec![]
                }
            }
        };

        let (palette, colors) = if previous.construct_params == Some(construct_params)
            && previous.output.adjusted == adjusted
        {
            debug!("Reusing {} palette", consumer);
            (
                previous.output.palette.clone(),
                previous.output.colors.clone(),
            )
        } else if adjusted.is_empty() {
            debug!("No {} input colors, palette is empty", consumer);
            (None, vec![])
        } else {
            debug!(
                "Building {} palette from {} colors into {} classes",
                consumer,
                adjusted.len(),
                construct_params.classes
            );
            match build_palette(&adjusted, &construct_params) {
                Ok(scale) => {
                    let colors = scale.hex_colors(construct_params.classes);
                    (Some(scale), colors)
                }
                Err(e) => {
                    warn!("Could not build {} palette: {}", consumer, e);
                    (None, vec![])
                }
            }
        };

        Channel {
            adjust_params: Some(adjust_params),
            construct_params: Some(construct_params),
            output: ChannelOutput {
                input,
                adjusted,
                palette,
                colors,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> Session {
        Session::with_seed(Settings::default(), 7).unwrap()
    }

    #[test]
    fn starts_with_a_palette_for_the_black_seed() {
        let session = session();
        for consumer in Consumer::BOTH {
            assert_eq!(session.input_colors(consumer).len(), 1);
            // a single sequential input is duplicated into two stops
            assert_eq!(session.adjusted_colors(consumer).len(), 2);
            assert_eq!(session.palette_colors(consumer).len(), 9);
        }
    }

    #[test]
    fn class_count_drives_the_palette_length() {
        let mut session = session();
        session.set_classes(Consumer::Area, 4).unwrap();
        assert_eq!(session.palette_colors(Consumer::Area).len(), 4);
        assert_eq!(session.palette_colors(Consumer::Point).len(), 9);
    }

    #[test]
    fn invalid_channel_edits_are_rolled_back() {
        let mut session = session();
        assert!(matches!(
            session.set_classes(Consumer::Point, 0),
            Err(Error::InvalidSettings(_))
        ));
        assert_eq!(session.settings().point.classes, 9);
    }

    #[test]
    fn unassigned_consumer_has_an_empty_palette() {
        let mut session = session();
        session.remove_from_input(Consumer::Point, SeedId(0));
        assert!(session.input_colors(Consumer::Point).is_empty());
        assert!(session.palette(Consumer::Point).is_none());
        assert!(session.palette_colors(Consumer::Point).is_empty());
        assert_eq!(session.palette_colors(Consumer::Area).len(), 9);
    }

    #[test]
    fn observers_only_hear_about_changed_consumers() {
        let mut session = session();
        session.load(&["#ff0000"]).unwrap();
        let seen = Rc::new(RefCell::new(vec![]));
        let log = Rc::clone(&seen);
        session.subscribe(move |consumer, output| {
            log.borrow_mut().push((consumer, output.colors.len()));
        });

        session.set_classes(Consumer::Point, 3).unwrap();
        assert_eq!(*seen.borrow(), vec![(Consumer::Point, 3)]);

        // same value again: nothing changes, nobody is told
        session.set_classes(Consumer::Point, 3).unwrap();
        assert_eq!(seen.borrow().len(), 1);

        session.set_cvd(Cvd::Achromatopsia);
        assert_eq!(
            *seen.borrow(),
            vec![
                (Consumer::Point, 3),
                (Consumer::Point, 3),
                (Consumer::Area, 9)
            ]
        );
    }

    #[test]
    fn seed_changes_reach_every_consumer_using_the_seed() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(vec![]));
        let log = Rc::clone(&seen);
        session.subscribe(move |consumer, output| {
            log.borrow_mut().push((consumer, output.input.len()));
        });

        // seed 0 changes color and is an input of both consumers
        session.load(&["#ff0000", "#00ff00"]).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![(Consumer::Point, 1), (Consumer::Area, 1)]
        );

        session.add_to_input_end(Consumer::Point, SeedId(1));
        assert_eq!(
            *seen.borrow(),
            vec![
                (Consumer::Point, 1),
                (Consumer::Area, 1),
                (Consumer::Point, 2)
            ]
        );
    }

    #[test]
    fn import_flags_expire() {
        let mut session = session();
        let start = Instant::now();

        session.load_from_text_at("#abcdef", start).unwrap();
        assert!(session.import_status().is_success(start));
        assert!(!session.import_status().is_error(start));
        assert!(session
            .import_status()
            .is_success(start + Duration::from_millis(1499)));
        assert!(!session
            .import_status()
            .is_success(start + IMPORT_STATUS_DURATION));
    }

    #[test]
    fn raising_again_restarts_the_window() {
        let mut status = ImportStatus::default();
        let start = Instant::now();
        status.raise_error(start);
        status.raise_error(start + Duration::from_secs(1));
        assert!(status.is_error(start + Duration::from_secs(2)));
        assert!(!status.is_error(start + Duration::from_secs(3)));
    }

    #[test]
    fn failed_text_initialization_raises_the_error_flag() {
        let mut session = session();
        let now = Instant::now();
        let result = session.initialize_at(&InitialSeeds::Text("nothing".to_string()), now);
        assert!(matches!(result, Err(Error::NoColorsFound)));
        assert!(session.import_status().is_error(now));
        assert_eq!(session.registry().colors(), vec!["#000000"]);
    }

    #[test]
    fn hue_rescale_uses_the_configured_range() {
        let mut session = session();
        session.load(&["#ff0000"]).unwrap();
        let mut settings = *session.settings();
        settings.hue_range.min = 200.0;
        settings.hue_range.max = 220.0;
        session.set_settings(settings).unwrap();

        session.rescale_hue_to_settings().unwrap();

        let color = crate::color_utils::parse_hex(&session.registry().colors()[0]).unwrap();
        let hue = crate::color_utils::hue_degrees(color);
        assert!((195.0..=225.0).contains(&hue), "hue was {}", hue);
    }
}
