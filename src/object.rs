//! Animated map objects
//!
//! An object is a composite of animations projected onto the map. The
//! composite's internal frame math, the surface it draws to and the static
//! per-type records are all collaborators behind narrow traits; this module
//! only does the mode/frame bookkeeping and the one-shot highlight.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use rand::Rng;

/// Graphical mode of an animated object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationMode {
    Neutral,
    Operating,
    Opened,
    Special,
}

/// Weapon class passed to the composite for objects, which carry none.
const DEFAULT_WEAPON_CLASS: &str = "HTH";

/// Contract with the composite-animation collaborator. Frame interpolation
/// lives entirely behind this trait.
pub trait CompositeAnimation {
    fn set_mode(&mut self, mode: AnimationMode, weapon_class: &str) -> Result<()>;
    fn set_direction(&mut self, direction: usize);
    fn set_anim_speed(&mut self, ticks_per_frame: u32);
    fn set_sub_loop(&mut self, start: u32, end: u32);
    fn set_play_loop(&mut self, play_loop: bool);
    fn set_current_frame(&mut self, frame: u32);
    fn advance(&mut self, elapsed: f64);
    fn render(&mut self, surface: &mut dyn Surface);
    fn animation_mode(&self) -> AnimationMode;
}

/// Render target with push/pop stack discipline: every push made during a
/// render call is popped before the call returns.
pub trait Surface {
    fn push_translation(&mut self, x: i32, y: i32);
    fn push_brightness(&mut self, factor: f64);
    fn pop(&mut self);
}

/// Per-mode slice of a static object-type record. Zero means "keep the
/// composite's default" for the speed and frame-count overrides.
#[derive(Debug, Clone, Default)]
pub struct ModeRecord {
    pub draw_layer: i32,
    pub frame_delta: u32,
    pub frame_count: u32,
    pub cycle: bool,
    pub start_frame: u32,
    pub selectable: bool,
}

/// Static per-object-type record, loaded once at startup and read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct ObjectRecord {
    pub name: String,
    pub token: String,
    pub modes: HashMap<AnimationMode, ModeRecord>,
}

impl ObjectRecord {
    pub fn mode(&self, mode: AnimationMode) -> ModeRecord {
        self.modes.get(&mode).cloned().unwrap_or_default()
    }
}

/// Object records indexed by token.
#[derive(Debug, Default)]
pub struct RecordTable {
    records: HashMap<String, Arc<ObjectRecord>>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    pub fn insert(&mut self, record: ObjectRecord) {
        self.records.insert(record.token.clone(), Arc::new(record));
    }

    pub fn get(&self, token: &str) -> Option<Arc<ObjectRecord>> {
        self.records.get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// An animated object placed on the map. World position splits into the
/// tile the object sits in and a fractional subcell offset within it.
pub struct Object {
    composite: Box<dyn CompositeAnimation>,
    record: Arc<ObjectRecord>,
    highlight: bool,
    tile_x: i32,
    tile_y: i32,
    subcell_x: f64,
    subcell_y: f64,
    draw_layer: i32,
}

impl Object {
    pub fn new(
        x: i32,
        y: i32,
        record: Arc<ObjectRecord>,
        composite: Box<dyn CompositeAnimation>,
    ) -> Result<Self> {
        let (loc_x, loc_y) = (f64::from(x), f64::from(y));
        let mut object = Self {
            composite,
            record,
            highlight: false,
            tile_x: x / 5,
            tile_y: y / 5,
            subcell_x: 1.0 + loc_x % 5.0,
            subcell_y: 1.0 + loc_y % 5.0,
            draw_layer: 0,
        };
        object.set_mode(AnimationMode::Neutral, 0, false)?;
        Ok(object)
    }

    /// Switch graphical mode. The only legal transition; every timing
    /// parameter comes from the static record, not from the caller.
    pub fn set_mode(
        &mut self,
        mode: AnimationMode,
        direction: usize,
        random_frame: bool,
    ) -> Result<()> {
        self.composite.set_mode(mode, DEFAULT_WEAPON_CLASS)?;
        self.composite.set_direction(direction);

        let record = self.record.mode(mode);
        self.draw_layer = record.draw_layer;

        // The record overrides the composite's animation data; zero means
        // keep the default.
        if record.frame_delta != 0 {
            self.composite.set_anim_speed(record.frame_delta);
        }
        if record.frame_count != 0 {
            self.composite.set_sub_loop(0, record.frame_count);
        }
        self.composite.set_play_loop(record.cycle);
        self.composite.set_current_frame(record.start_frame);

        if random_frame && record.frame_count > 0 {
            let frame = rand::thread_rng().gen_range(0..record.frame_count);
            self.composite.set_current_frame(frame);
        }
        Ok(())
    }

    /// Arm the one-shot highlight; it applies to the next render only.
    pub fn highlight(&mut self) {
        self.highlight = true;
    }

    pub fn selectable(&self) -> bool {
        self.record.mode(self.composite.animation_mode()).selectable
    }

    /// Draw the object translated by its subcell offset on the isometric
    /// axes. Pushes are matched by pops on every path, and the highlight
    /// flag is cleared regardless of whether it was set.
    pub fn render(&mut self, target: &mut dyn Surface) {
        target.push_translation(
            ((self.subcell_x - self.subcell_y) * 16.0) as i32,
            ((self.subcell_x + self.subcell_y) * 8.0) as i32,
        );
        let highlighted = self.highlight;
        if highlighted {
            target.push_brightness(2.0);
        }
        self.composite.render(target);
        if highlighted {
            target.pop();
        }
        target.pop();
        self.highlight = false;
    }

    /// Progress the underlying animation by elapsed seconds.
    pub fn advance(&mut self, elapsed: f64) {
        self.composite.advance(elapsed);
    }

    pub fn layer(&self) -> i32 {
        self.draw_layer
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.tile_x, self.tile_y)
    }

    pub fn position(&self) -> (f64, f64) {
        (
            f64::from(self.tile_x) + self.subcell_x / 5.0,
            f64::from(self.tile_y) + self.subcell_y / 5.0,
        )
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct CallLog {
        calls: Vec<String>,
        mode: Option<AnimationMode>,
    }

    struct FakeComposite {
        log: Rc<RefCell<CallLog>>,
    }

    impl CompositeAnimation for FakeComposite {
        fn set_mode(&mut self, mode: AnimationMode, weapon_class: &str) -> Result<()> {
            let mut log = self.log.borrow_mut();
            log.calls.push(format!("set_mode({mode:?},{weapon_class})"));
            log.mode = Some(mode);
            Ok(())
        }

        fn set_direction(&mut self, direction: usize) {
            self.log
                .borrow_mut()
                .calls
                .push(format!("set_direction({direction})"));
        }

        fn set_anim_speed(&mut self, ticks_per_frame: u32) {
            self.log
                .borrow_mut()
                .calls
                .push(format!("set_anim_speed({ticks_per_frame})"));
        }

        fn set_sub_loop(&mut self, start: u32, end: u32) {
            self.log
                .borrow_mut()
                .calls
                .push(format!("set_sub_loop({start},{end})"));
        }

        fn set_play_loop(&mut self, play_loop: bool) {
            self.log
                .borrow_mut()
                .calls
                .push(format!("set_play_loop({play_loop})"));
        }

        fn set_current_frame(&mut self, frame: u32) {
            self.log
                .borrow_mut()
                .calls
                .push(format!("set_current_frame({frame})"));
        }

        fn advance(&mut self, elapsed: f64) {
            self.log.borrow_mut().calls.push(format!("advance({elapsed})"));
        }

        fn render(&mut self, _surface: &mut dyn Surface) {
            self.log.borrow_mut().calls.push("render".to_string());
        }

        fn animation_mode(&self) -> AnimationMode {
            self.log.borrow().mode.unwrap_or(AnimationMode::Neutral)
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<String>,
        depth: i32,
        max_depth: i32,
    }

    impl Surface for RecordingSurface {
        fn push_translation(&mut self, x: i32, y: i32) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            self.ops.push(format!("translate({x},{y})"));
        }

        fn push_brightness(&mut self, factor: f64) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            self.ops.push(format!("brightness({factor})"));
        }

        fn pop(&mut self) {
            self.depth -= 1;
            self.ops.push("pop".to_string());
        }
    }

    fn barrel_record() -> Arc<ObjectRecord> {
        let mut modes = HashMap::new();
        modes.insert(
            AnimationMode::Neutral,
            ModeRecord {
                draw_layer: 2,
                frame_delta: 0,
                frame_count: 8,
                cycle: true,
                start_frame: 0,
                selectable: true,
            },
        );
        modes.insert(
            AnimationMode::Operating,
            ModeRecord {
                draw_layer: 3,
                frame_delta: 4,
                frame_count: 12,
                cycle: false,
                start_frame: 2,
                selectable: false,
            },
        );
        Arc::new(ObjectRecord {
            name: "Barrel".to_string(),
            token: "BB".to_string(),
            modes,
        })
    }

    fn make_object(x: i32, y: i32) -> (Object, Rc<RefCell<CallLog>>) {
        let log = Rc::new(RefCell::new(CallLog::default()));
        let composite = Box::new(FakeComposite { log: log.clone() });
        let object = Object::new(x, y, barrel_record(), composite).unwrap();
        (object, log)
    }

    #[test]
    fn test_new_object_enters_neutral_mode() {
        let (object, log) = make_object(7, 3);
        assert_eq!(log.borrow().mode, Some(AnimationMode::Neutral));
        assert_eq!(object.layer(), 2);
        assert_eq!(object.tile(), (1, 0));
        assert!(object.selectable());
        assert_eq!(object.name(), "Barrel");
    }

    #[test]
    fn test_set_mode_applies_record_overrides() {
        let (mut object, log) = make_object(0, 0);
        log.borrow_mut().calls.clear();

        object
            .set_mode(AnimationMode::Operating, 1, false)
            .unwrap();

        let calls = log.borrow().calls.clone();
        assert_eq!(
            calls,
            vec![
                "set_mode(Operating,HTH)",
                "set_direction(1)",
                "set_anim_speed(4)",
                "set_sub_loop(0,12)",
                "set_play_loop(false)",
                "set_current_frame(2)",
            ]
        );
        assert_eq!(object.layer(), 3);
        assert!(!object.selectable());
    }

    #[test]
    fn test_zero_frame_delta_keeps_default_speed() {
        let (mut object, log) = make_object(0, 0);
        log.borrow_mut().calls.clear();

        object.set_mode(AnimationMode::Neutral, 0, false).unwrap();

        let calls = log.borrow().calls.clone();
        assert!(!calls.iter().any(|c| c.starts_with("set_anim_speed")));
        assert!(calls.contains(&"set_sub_loop(0,8)".to_string()));
    }

    #[test]
    fn test_render_highlight_is_one_shot() {
        let (mut object, _log) = make_object(2, 1);

        object.highlight();
        let mut surface = RecordingSurface::default();
        object.render(&mut surface);
        assert!(surface.ops.iter().any(|op| op.starts_with("brightness")));
        assert_eq!(surface.depth, 0, "pushes must be balanced by pops");
        assert_eq!(surface.max_depth, 2);

        let mut surface = RecordingSurface::default();
        object.render(&mut surface);
        assert!(!surface.ops.iter().any(|op| op.starts_with("brightness")));
        assert_eq!(surface.depth, 0);
        assert_eq!(surface.max_depth, 1);
    }

    #[test]
    fn test_render_translates_by_subcell_offset() {
        // x=7, y=3 puts the object at subcell (3, 4).
        let (mut object, _log) = make_object(7, 3);
        let mut surface = RecordingSurface::default();
        object.render(&mut surface);
        assert_eq!(surface.ops[0], "translate(-16,56)");
    }

    #[test]
    fn test_advance_forwards_elapsed_time() {
        let (mut object, log) = make_object(0, 0);
        log.borrow_mut().calls.clear();
        object.advance(0.25);
        assert_eq!(log.borrow().calls, vec!["advance(0.25)"]);
    }

    #[test]
    fn test_record_table_lookup() {
        let mut table = RecordTable::new();
        assert!(table.is_empty());
        table.insert(ObjectRecord {
            name: "Barrel".to_string(),
            token: "BB".to_string(),
            modes: HashMap::new(),
        });
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("BB").unwrap().name, "Barrel");
        assert!(table.get("XX").is_none());
    }
}
