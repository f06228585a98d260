use arcade_pad::{
    Axes, ButtonId, Direction, DirectionMode, Gamepad, GamepadConfig, HidEmitter, LineId, LineIo,
    MenuState, Millis,
};

// Arcade preset line numbers.
const A: u8 = 0;
const L: u8 = 4;
const UP: u8 = 8;
const RIGHT: u8 = 9;
const DOWN: u8 = 10;
const MENU: u8 = 12;
const STATUS_LED: usize = 6;

#[derive(Default)]
struct Bench {
    inputs: [bool; 16],
    leds: [bool; 8],
}

impl LineIo for Bench {
    fn read_line(&mut self, line: LineId) -> bool {
        self.inputs[line.index()]
    }

    fn write_line(&mut self, line: LineId, on: bool) {
        self.leds[line.index()] = on;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Report {
    Press(u8),
    Release(u8),
    Hat(Direction),
    Axes(Axes),
}

#[derive(Default)]
struct Host {
    reports: Vec<Report>,
}

impl HidEmitter for Host {
    fn press(&mut self, code: u8) {
        self.reports.push(Report::Press(code));
    }

    fn release(&mut self, code: u8) {
        self.reports.push(Report::Release(code));
    }

    fn set_hat(&mut self, direction: Direction) {
        self.reports.push(Report::Hat(direction));
    }

    fn set_axes(&mut self, axes: Axes) {
        self.reports.push(Report::Axes(axes));
    }
}

struct Rig {
    pad: Gamepad,
    bench: Bench,
    host: Host,
    now: Millis,
    connected: bool,
}

impl Rig {
    fn new(config: GamepadConfig) -> Self {
        let mut rig = Self {
            pad: Gamepad::new(config, 0),
            bench: Bench::default(),
            host: Host::default(),
            now: 0,
            connected: true,
        };
        // First connected tick announces the centred hat.
        rig.step(5);
        rig.host.reports.clear();
        rig
    }

    fn arcade() -> Self {
        Self::new(GamepadConfig::arcade())
    }

    fn step(&mut self, ms: Millis) -> bool {
        self.now += ms;
        self.pad
            .tick(&mut self.bench, &mut self.host, self.now, self.connected)
    }

    fn set(&mut self, line: u8, on: bool) -> bool {
        self.bench.inputs[line as usize] = on;
        self.step(5)
    }

    fn click(&mut self, line: u8) {
        self.set(line, true);
        self.set(line, false);
    }

    fn take(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.host.reports)
    }
}

#[test]
fn press_and_release_reach_host_once() {
    let mut rig = Rig::arcade();
    rig.set(A, true);
    rig.step(5);
    rig.step(5);
    rig.set(A, false);
    rig.step(5);
    assert_eq!(rig.take(), vec![Report::Press(1), Report::Release(1)]);
}

#[test]
fn dpad_changes_emit_hat() {
    let mut rig = Rig::arcade();
    rig.set(UP, true);
    rig.set(RIGHT, true);
    rig.set(UP, false);
    rig.set(RIGHT, false);
    assert_eq!(
        rig.take(),
        vec![
            Report::Hat(Direction::Up),
            Report::Hat(Direction::UpRight),
            Report::Hat(Direction::Right),
            Report::Hat(Direction::Centered),
        ]
    );
}

#[test]
fn axes_mode_reports_axis_pairs() {
    let config = GamepadConfig::builder(*GamepadConfig::arcade().dpad(), LineId(MENU))
        .direction_mode(DirectionMode::Axes)
        .build()
        .unwrap();
    let mut rig = Rig::new(config);
    rig.set(UP, true);
    rig.set(UP, false);
    assert_eq!(
        rig.take(),
        vec![Report::Axes(Axes::new(0, -127)), Report::Axes(Axes::CENTER)]
    );
}

#[test]
fn menu_entry_releases_held_button_and_it_stays_released() {
    let mut rig = Rig::arcade();
    rig.set(A, true);
    assert_eq!(rig.take(), vec![Report::Press(1)]);

    rig.click(MENU);
    assert_eq!(rig.pad.menu_state(), MenuState::Idle);
    assert_eq!(rig.take(), vec![Report::Release(1)]);

    // Still physically held: must not be picked up as a selection.
    rig.step(5);
    assert_eq!(rig.pad.menu_state(), MenuState::Idle);

    rig.set(A, false);
    rig.click(MENU);
    assert_eq!(rig.pad.menu_state(), MenuState::Normal);
    assert!(rig.take().is_empty());

    rig.set(A, true);
    assert_eq!(rig.take(), vec![Report::Press(1)]);
}

#[test]
fn menu_swallows_input_and_lights_leds() {
    let mut rig = Rig::arcade();
    rig.click(MENU);
    assert!(rig.bench.leds[..6].iter().all(|&on| on));
    assert!(rig.bench.leds[STATUS_LED]);

    rig.click(A);
    rig.set(UP, true);
    rig.set(UP, false);
    assert_eq!(rig.pad.menu_state(), MenuState::Configuring(ButtonId(0)));
    assert!(rig.take().is_empty());
    assert_eq!(rig.bench.leds[..6], [true, false, false, false, false, false]);

    rig.click(MENU);
    assert_eq!(rig.bench.leds, [false; 8]);
}

#[test]
fn dpad_held_across_menu_exit_is_held_off() {
    let mut rig = Rig::arcade();
    rig.click(MENU);
    rig.click(A);
    rig.set(UP, true);
    rig.step(150);
    rig.click(MENU);
    rig.step(5);
    assert!(rig.take().is_empty());
    assert_eq!(rig.pad.direction(), Direction::Centered);

    rig.set(UP, false);
    rig.set(RIGHT, true);
    assert_eq!(rig.take(), vec![Report::Hat(Direction::Right)]);
}

#[test]
fn autofire_configured_in_menu_pulses_output() {
    let mut rig = Rig::arcade();
    rig.click(MENU);
    rig.click(A);
    rig.click(A);
    rig.click(MENU);
    let autofire = rig.pad.buttons()[ButtonId(0)].autofire();
    assert!(autofire.is_enabled());
    assert_eq!(autofire.rate_ms(), 20);
    rig.take();

    rig.set(A, true);
    for _ in 0..40 {
        rig.step(5);
    }
    rig.set(A, false);

    let reports = rig.take();
    assert!(reports.len() >= 8, "got {reports:?}");
    for (i, report) in reports.iter().enumerate() {
        let want = if i % 2 == 0 {
            Report::Press(1)
        } else {
            Report::Release(1)
        };
        assert_eq!(*report, want);
    }
    assert_eq!(reports.last(), Some(&Report::Release(1)));
}

#[test]
fn rate_tuning_from_dpad() {
    let mut rig = Rig::arcade();
    rig.click(MENU);
    rig.click(A);
    rig.set(UP, true);
    for _ in 0..100 {
        rig.step(10);
    }
    rig.set(UP, false);
    let raised = rig.pad.buttons()[ButtonId(0)].autofire().rate_ms();
    assert!(raised > 20);

    rig.set(DOWN, true);
    for _ in 0..400 {
        rig.step(10);
    }
    rig.set(DOWN, false);
    assert_eq!(rig.pad.buttons()[ButtonId(0)].autofire().rate_ms(), 10);
}

#[test]
fn shift_chord_uses_alternate_code_and_skips_menu() {
    let mut rig = Rig::arcade();
    rig.set(MENU, true);
    rig.set(A, true);
    // Dropping the shift mid-hold keeps the latched code.
    rig.set(MENU, false);
    rig.set(A, false);
    assert_eq!(rig.take(), vec![Report::Press(9), Report::Release(9)]);
    assert_eq!(rig.pad.menu_state(), MenuState::Normal);
}

#[test]
fn shift_chord_without_alternate_is_suppressed() {
    let mut rig = Rig::arcade();
    rig.set(MENU, true);
    rig.set(L, true);
    rig.set(MENU, false);
    rig.step(5);
    rig.set(L, false);
    assert!(rig.take().is_empty());
    assert_eq!(rig.pad.menu_state(), MenuState::Normal);
}

fn enable_autofire(rig: &mut Rig, line: u8) {
    rig.click(MENU);
    rig.click(line);
    rig.click(line);
    rig.click(MENU);
    rig.take();
}

#[test]
fn autofire_chord_keeps_alternate_code_after_shift_release() {
    let mut rig = Rig::arcade();
    enable_autofire(&mut rig, A);

    rig.set(MENU, true);
    rig.set(A, true);
    rig.set(MENU, false);
    for _ in 0..40 {
        rig.step(5);
    }
    rig.set(A, false);

    let reports = rig.take();
    assert!(reports.len() >= 8, "got {reports:?}");
    assert!(
        reports
            .iter()
            .all(|r| matches!(r, Report::Press(9) | Report::Release(9))),
        "got {reports:?}"
    );
    assert_eq!(reports.last(), Some(&Report::Release(9)));
}

#[test]
fn autofire_chord_without_alternate_stays_suppressed_for_whole_hold() {
    let mut rig = Rig::arcade();
    enable_autofire(&mut rig, L);
    assert!(rig.pad.buttons()[ButtonId(4)].autofire().is_enabled());

    rig.set(MENU, true);
    rig.set(L, true);
    rig.set(MENU, false);
    for _ in 0..40 {
        rig.step(5);
    }
    rig.set(L, false);
    assert!(rig.take().is_empty());

    // A fresh hold without the shift sends the primary code again.
    rig.set(L, true);
    rig.set(L, false);
    assert_eq!(rig.take(), vec![Report::Press(5), Report::Release(5)]);
}

#[test]
fn disconnected_is_silent_and_reconnect_resyncs() {
    let mut rig = Rig::arcade();
    rig.connected = false;
    rig.set(A, true);
    rig.set(RIGHT, true);
    assert!(rig.take().is_empty());

    rig.connected = true;
    rig.step(5);
    assert_eq!(
        rig.take(),
        vec![Report::Press(1), Report::Hat(Direction::Right)]
    );
}

#[test]
fn activity_and_idle_time() {
    let mut rig = Rig::arcade();
    assert!(rig.set(A, true));
    assert_eq!(rig.pad.pressed_mask(), 0b1);
    assert!(!rig.set(A, false));
    let released_at = rig.now;
    for _ in 0..10 {
        assert!(!rig.step(100));
    }
    assert_eq!(rig.pad.idle_ms(rig.now), rig.now - released_at + 5);
    assert!(rig.set(UP, true));
    assert_eq!(rig.pad.idle_ms(rig.now), 0);
}

#[test]
fn button_led_follows_press_and_slider_runs_when_idle() {
    let mut rig = Rig::arcade();
    rig.set(A, true);
    assert!(rig.bench.leds[0]);
    rig.set(A, false);
    assert!(!rig.bench.leds[0]);

    let mut lit = false;
    for _ in 0..400 {
        rig.step(10);
        lit |= rig.bench.leds[0];
    }
    assert!(lit, "slider never reached the first LED");
}
