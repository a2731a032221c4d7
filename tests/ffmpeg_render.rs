//! End-to-end runs against the system `ffmpeg`. Skipped when ffmpeg (with `drawtext`) or a
//! system font is not available.

use std::path::{Path, PathBuf};
use std::process::Command;

use textburn::{
    FontResolver, OverlayConfig, PreviewConfig, ProcessRunner, burn_overlays, generate_previews,
    parse_script_reader, walk_fonts,
};

fn ffmpeg_with_drawtext() -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-filters"])
        .output()
        .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).contains("drawtext"))
        .unwrap_or(false)
}

fn system_ttf() -> Option<PathBuf> {
    walk_fonts("/usr/share/fonts")
        .map(|f| f.path)
        .find(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("ttf")))
}

fn synth_video(path: &Path) -> anyhow::Result<()> {
    let status = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "testsrc=size=64x64:rate=10",
            "-f",
            "lavfi",
            "-i",
            "sine=frequency=440:sample_rate=48000",
            "-t",
            "1",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
        ])
        .arg(path)
        .status()?;
    anyhow::ensure!(status.success(), "ffmpeg failed creating test clip");
    Ok(())
}

#[test]
fn burns_two_overlays_with_real_ffmpeg() {
    if !ffmpeg_with_drawtext() {
        return;
    }
    let Some(font) = system_ttf() else {
        return;
    };

    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.mp4");
    synth_video(&input).unwrap();
    let output = tmp.path().join("out/burned.mp4");

    let script = format!(
        "0,00:00:00.5,\"Hi, there\",2,2,{0},12\n00:00:00.5,1,\"it's: done\",4,30,{0},10\n",
        font.display()
    );
    let overlays = parse_script_reader(script.as_bytes()).unwrap();

    let cfg = OverlayConfig {
        fonts: FontResolver::Search {
            dir: PathBuf::from("/usr/share/fonts"),
        },
        ..OverlayConfig::default()
    };
    let stats = burn_overlays(&mut ProcessRunner, &cfg, &input, &overlays, &output).unwrap();

    assert_eq!(stats.overlays_applied, 2);
    assert!(std::fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn renders_a_preview_with_real_ffmpeg() {
    if !ffmpeg_with_drawtext() {
        return;
    }
    let Some(font) = system_ttf() else {
        return;
    };

    let tmp = tempfile::tempdir().unwrap();
    let font_dir = tmp.path().join("fonts");
    std::fs::create_dir_all(&font_dir).unwrap();
    std::fs::copy(&font, font_dir.join("Sample Font.ttf")).unwrap();

    let cfg = PreviewConfig {
        font_dir,
        out_dir: tmp.path().join("previews"),
        width: 160,
        height: 120,
        duration_sec: 0.5,
        font_size: 16,
        ..PreviewConfig::default()
    };
    let report = generate_previews(&mut ProcessRunner, &cfg).unwrap();

    assert!(report.failed.is_empty(), "{:?}", report.failed);
    assert_eq!(
        report.generated,
        [cfg.out_dir.join("Sample_Font.ttf.mp4")]
    );
    assert!(report.generated[0].is_file());
}
