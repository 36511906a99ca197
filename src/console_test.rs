use canvas::engine::{CanvasConfig, Inbound, TransportError};
use canvas::grid::GridError;
use canvas::render::Framebuffer;
use canvas::storage::MemoryStore;
use canvas::viewport::Viewport;

use super::*;

const T0: i64 = 1_700_000_000_000;

#[derive(Default)]
struct Sent(Vec<PixelUpdate>);

impl Transport for Sent {
    fn send_placement(&mut self, update: &PixelUpdate) -> Result<(), TransportError> {
        self.0.push(*update);
        Ok(())
    }
}

fn session() -> SyncClient<Framebuffer, Sent, MemoryStore> {
    let config = CanvasConfig { width: 8, height: 8, pixel_size: 4, ..CanvasConfig::default() };
    let surface = Framebuffer::for_viewport(&Viewport::new(8, 8, 4));
    SyncClient::new(config, surface, Sent::default(), MemoryStore::new())
}

fn say(reply: Reply) -> String {
    match reply {
        Reply::Say(text) => text,
        Reply::Quit => panic!("unexpected quit"),
    }
}

fn parse(line: &str) -> Command {
    parse_command(line).expect("parse").expect("command")
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn blank_lines_are_ignored() {
    assert_eq!(parse_command("   "), Ok(None));
}

#[test]
fn place_parses_with_and_without_color() {
    assert_eq!(parse("place 3 4"), Command::Place { x: 3, y: 4, color: None });
    assert_eq!(parse("p 3 4 red"), Command::Place { x: 3, y: 4, color: Some(Color::new(0xFF_0000)) });
    assert_eq!(
        parse("place 0 1 rgb(0, 0, 255)"),
        Command::Place { x: 0, y: 1, color: Some(Color::new(0x00_00FF)) }
    );
}

#[test]
fn place_rejects_bad_arguments() {
    assert_eq!(parse_command("place 3"), Err(CommandError::Usage("place X Y [COLOR]")));
    assert_eq!(parse_command("place -1 3"), Err(CommandError::BadNumber("-1".to_owned())));
    assert_eq!(parse_command("place 1 3 mauve"), Err(CommandError::BadColor("mauve".to_owned())));
}

#[test]
fn other_commands_parse() {
    assert_eq!(parse("preview 1 2"), Command::Preview { x: 1, y: 2 });
    assert_eq!(parse("click -3 17"), Command::Click { x: -3, y: 17 });
    assert_eq!(parse("confirm"), Command::Confirm);
    assert_eq!(parse("cancel"), Command::Cancel);
    assert_eq!(parse("color #0f0"), Command::SetColor(Color::new(0x00_FF00)));
    assert_eq!(parse("grid"), Command::Grid(GridToggle::Flip));
    assert_eq!(parse("grid off"), Command::Grid(GridToggle::Off));
    assert_eq!(parse("save out.png"), Command::Save { path: "out.png".into(), scale: 1 });
    assert_eq!(parse("save out.png 10"), Command::Save { path: "out.png".into(), scale: 10 });
    assert_eq!(parse("STATUS"), Command::Status);
    assert_eq!(parse("quit"), Command::Quit);
}

#[test]
fn unknown_command_is_reported() {
    assert_eq!(parse_command("paint 1 2"), Err(CommandError::Unknown("paint".to_owned())));
}

// =============================================================
// Execution
// =============================================================

#[test]
fn place_uses_current_color_and_reports_cooldown() {
    let mut client = session();
    client.set_color(Color::new(0x00_00FF));

    let text = say(execute(&mut client, parse("place 2 2"), T0));
    assert_eq!(text, "placed #0000ff at (2, 2)");
    assert_eq!(client.transport().0, vec![PixelUpdate::new(2, 2, Color::new(0x00_00FF))]);

    let text = say(execute(&mut client, parse("place 3 3"), T0 + 2_000));
    assert_eq!(text, "you can't place a pixel yet, 8000 ms left");
    assert_eq!(client.transport().0.len(), 1);
}

#[test]
fn place_out_of_bounds_is_explained() {
    let mut client = session();
    let text = say(execute(&mut client, parse("place 8 0"), T0));
    assert_eq!(text, GridError::OutOfBounds { x: 8, y: 0, width: 8, height: 8 }.to_string());
}

#[test]
fn click_then_confirm_places_preview() {
    let mut client = session();
    let text = say(execute(&mut client, parse("click 9 5"), T0));
    assert_eq!(text, "preview #000000 at (2, 1); `confirm` to place");

    let text = say(execute(&mut client, Command::Confirm, T0));
    assert_eq!(text, "placed #000000 at (2, 1)");
    assert_eq!(client.preview(), None);
}

#[test]
fn click_outside_canvas_is_explained() {
    let mut client = session();
    let text = say(execute(&mut client, parse("click 40 0"), T0));
    assert_eq!(text, "click is outside the canvas");
}

#[test]
fn confirm_without_preview_is_explained() {
    let mut client = session();
    let text = say(execute(&mut client, Command::Confirm, T0));
    assert_eq!(text, "no preview pixel to place");
}

#[test]
fn cancel_drops_preview() {
    let mut client = session();
    execute(&mut client, parse("preview 1 1"), T0);
    assert!(client.preview().is_some());
    execute(&mut client, Command::Cancel, T0);
    assert_eq!(client.preview(), None);
}

#[test]
fn grid_toggle_flips_state() {
    let mut client = session();
    assert_eq!(say(execute(&mut client, Command::Grid(GridToggle::Flip), T0)), "grid on");
    assert!(client.show_grid());
    assert_eq!(say(execute(&mut client, Command::Grid(GridToggle::Flip), T0)), "grid off");
}

#[test]
fn status_summarizes_session() {
    let mut client = session();
    client.handle(Inbound::PresenceCount(3));
    let text = say(execute(&mut client, Command::Status, T0));
    assert_eq!(
        text,
        "waiting for canvas; 3 online; color #000000; preview none; grid off; You can place a pixel now"
    );
}

#[test]
fn save_writes_png() {
    let mut client = session();
    let path = std::env::temp_dir().join(format!("painter-console-{}.png", std::process::id()));
    let text = say(execute(&mut client, Command::Save { path: path.clone(), scale: 2 }, T0));
    assert_eq!(text, format!("saved {}", path.display()));
    assert!(path.exists());
}

#[test]
fn save_with_huge_scale_reports_instead_of_crashing() {
    let mut client = session();
    let path = std::env::temp_dir().join(format!("painter-console-huge-{}.png", std::process::id()));
    let text = say(execute(&mut client, Command::Save { path: path.clone(), scale: u32::MAX }, T0));
    assert!(text.starts_with("save failed: export of "), "{text}");
    assert!(!path.exists());
}

#[test]
fn quit_ends_session() {
    let mut client = session();
    assert_eq!(execute(&mut client, Command::Quit, T0), Reply::Quit);
}

#[test]
fn palette_lists_every_color() {
    let mut client = session();
    let text = say(execute(&mut client, Command::Palette, T0));
    assert_eq!(text.lines().count(), PALETTE.len());
    assert!(text.contains("orange #ffa500"));
}

// =============================================================
// Notices
// =============================================================

#[test]
fn describe_skips_routine_pixel_updates() {
    assert_eq!(describe(&Notice::Pixel(PixelUpdate::new(0, 0, Color::BLACK))), None);
    assert_eq!(describe(&Notice::Synced { cells: 4 }), Some("canvas loaded (4 pixels)".to_owned()));
    assert_eq!(describe(&Notice::Message("hi".into())), Some("server: hi".to_owned()));
    assert_eq!(describe(&Notice::Presence(2)), Some("2 online".to_owned()));
}
