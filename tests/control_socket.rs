use std::time::Duration;

use presentation_surface::DisplayCanvas;
use presentation_surface::events::SurfaceState;
use presentation_surface::surface::geometry::Size;
use presentation_surface::tasks::control;
use presentation_surface::tasks::ui_thread::{UiSettings, UiThread};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;

fn spawn_ui() -> UiThread {
    let settings = UiSettings {
        initial_size: Size::new(800.0, 600.0),
        ..UiSettings::default()
    };
    UiThread::spawn(settings, || DisplayCanvas::new(false, true)).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn socket_round_trip_toggles_and_reports_state() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("run").join("control.sock");
    let ui = spawn_ui();
    let cancel = CancellationToken::new();
    let server = tokio::spawn(control::run(socket.clone(), ui.handle(), cancel.clone()));

    let mut stream = None;
    for _ in 0..100 {
        if let Ok(s) = UnixStream::connect(&socket).await {
            stream = Some(s);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let stream = stream.expect("control socket never came up");
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer
        .write_all(b"{\"command\":\"toggle-black\"}\n")
        .await
        .unwrap();
    let reply = lines.next_line().await.unwrap().unwrap();
    let state: SurfaceState = serde_json::from_str(&reply).unwrap();
    assert!(state.blacked);
    assert!(state.stage_view);
    assert_eq!(state.layers.first().map(String::as_str), Some("placeholder"));
    assert_eq!(state.placeholder_fit, Size::new(800.0, 600.0));

    writer.write_all(b"not json\n").await.unwrap();
    let reply = lines.next_line().await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert!(value.get("error").is_some());

    writer
        .write_all(b"{\"command\":\"set-background-path\",\"path\":\"/media/notes.docx\"}\n")
        .await
        .unwrap();
    let reply = lines.next_line().await.unwrap().unwrap();
    let after: SurfaceState = serde_json::from_str(&reply).unwrap();
    assert_eq!(after.background, state.background);

    cancel.cancel();
    server.await.unwrap().unwrap();
    assert!(!socket.exists());
    ui.join().unwrap();
}

#[tokio::test]
async fn respond_rejects_unknown_commands() {
    let ui = spawn_ui();
    let reply = control::respond(&ui.handle(), r#"{"command":"self-destruct"}"#).await;
    assert!(reply.contains("error"));

    let reply = control::respond(&ui.handle(), r#"{"command":"state"}"#).await;
    let state: SurfaceState = serde_json::from_str(&reply).unwrap();
    assert!(!state.blacked);
    ui.join().unwrap();
}
