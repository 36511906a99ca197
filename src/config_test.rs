use clap::Parser;

use super::*;

#[test]
fn ws_url_maps_scheme_and_joins_path() {
    assert_eq!(ws_url("http://localhost:3000", "/ws").expect("url"), "ws://localhost:3000/ws");
    assert_eq!(ws_url("https://paint.example/", "socket").expect("url"), "wss://paint.example/socket");
}

#[test]
fn ws_url_rejects_other_schemes() {
    let err = ws_url("ftp://paint.example", "/ws").unwrap_err();
    assert!(matches!(err, NetError::InvalidBaseUrl(url) if url == "ftp://paint.example"));
}

#[test]
fn snapshot_url_appends_canvas_route() {
    assert_eq!(snapshot_url("http://localhost:3000/"), "http://localhost:3000/canvas/");
}

#[test]
fn defaults_match_the_full_canvas() {
    let cli = Cli::try_parse_from(["painter"]).expect("parse");
    assert_eq!(cli.base_url, DEFAULT_BASE_URL);
    assert_eq!(cli.command, None);
    let config = cli.canvas_config();
    assert_eq!((config.width, config.height), (500, 500));
    assert_eq!(config.cooldown_ms, 10_000);
    assert_eq!(config.pixel_size, 1);
}

#[test]
fn flags_override_defaults() {
    let cli = Cli::try_parse_from([
        "painter",
        "--base-url",
        "https://paint.example",
        "--cooldown-ms",
        "500",
        "snapshot",
        "out.png",
        "--scale",
        "4",
    ])
    .expect("parse");
    assert_eq!(cli.canvas_config().cooldown_ms, 500);
    assert_eq!(cli.ws_url().expect("url"), "wss://paint.example/ws");
    assert_eq!(cli.command, Some(Command::Snapshot { out: "out.png".into(), scale: 4 }));
}

#[test]
fn geometry_outside_the_flag_ranges_is_refused() {
    assert!(Cli::try_parse_from(["painter", "--pixel-size", "0"]).is_err());
    assert!(Cli::try_parse_from(["painter", "--pixel-size", "4294967295"]).is_err());
    assert!(Cli::try_parse_from(["painter", "--width", "10001"]).is_err());
}

#[test]
fn oversized_framebuffer_fails_validation() {
    let cli = Cli::try_parse_from(["painter", "--width", "10000", "--height", "10000", "--pixel-size", "100"])
        .expect("each flag is in range");
    assert!(matches!(
        cli.validate(),
        Err(ConfigError::FramebufferTooLarge { width: 10_000, height: 10_000, pixel_size: 100 })
    ));

    let browser_sized = Cli::try_parse_from(["painter", "--pixel-size", "10"]).expect("parse");
    assert!(browser_sized.validate().is_ok());
}
