#[cfg(all(unix, feature = "native-export"))]
mod unix {
    use mdtex_render::images::needs_conversion;
    use mdtex_render::{ConvertError, ImageConverter, ImageTool};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::tempdir;

    /// Writes its arguments to `<name>.args` and "png" to the output path,
    /// which is the last argument for ImageMagick and follows `-o`/`--out`
    /// for the others.
    const TOOL: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "__ARGS__"
OUT=""
NEXT=""
for arg in "$@"; do
  if [ -n "$NEXT" ]; then OUT="$arg"; NEXT=""; fi
  case $arg in
    -o|--out) NEXT=1 ;;
  esac
  LAST="$arg"
done
[ -z "$OUT" ] && OUT="$LAST"
printf 'png' > "$OUT"
exit __STATUS__
"#;

    fn stub_tool(dir: &Path, name: &str, status: i32) -> PathBuf {
        let body = TOOL
            .replace("__ARGS__", &dir.join(format!("{name}.args")).to_string_lossy())
            .replace("__STATUS__", &status.to_string());
        let script = dir.join(format!("{name}.sh"));
        fs::write(&script, body).unwrap();
        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).unwrap();
        script
    }

    fn recorded_args(dir: &Path, name: &str) -> Vec<String> {
        fs::read_to_string(dir.join(format!("{name}.args")))
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn bmp_converts_next_to_input_with_imagemagick() {
        let tools = tempdir().unwrap();
        let magick = stub_tool(tools.path(), "magick", 0);
        let images = tempdir().unwrap();
        let input = images.path().join("plot.v2.bmp");
        fs::write(&input, b"BM").unwrap();

        let written = ImageConverter::new()
            .with_tool(ImageTool::ImageMagick, &magick)
            .convert(&input, None)
            .unwrap();

        assert_eq!(written, images.path().join("plot.v2.png"));
        assert_eq!(fs::read(&written).unwrap(), b"png");
        let args = recorded_args(tools.path(), "magick");
        assert_eq!(args[0], input.to_string_lossy());
        assert_eq!(&args[1..5], ["-quality", "90", "-resize", "2048x2048>"]);
    }

    #[test]
    fn svg_prefers_rsvg_and_rasters_skip_it() {
        let tools = tempdir().unwrap();
        let rsvg = stub_tool(tools.path(), "rsvg", 0);
        let sips = stub_tool(tools.path(), "sips", 0);
        let converter = ImageConverter::new()
            .with_tool(ImageTool::Rsvg, &rsvg)
            .with_tool(ImageTool::Sips, &sips);
        let images = tempdir().unwrap();
        let svg = images.path().join("logo.svg");
        let gif = images.path().join("anim.gif");
        fs::write(&svg, "<svg/>").unwrap();
        fs::write(&gif, "GIF89a").unwrap();

        converter.convert(&svg, None).unwrap();
        assert_eq!(recorded_args(tools.path(), "rsvg")[..2], ["-f", "png"]);

        let out = images.path().join("png");
        let written = converter.convert(&gif, Some(&out)).unwrap();
        assert_eq!(written, out.join("anim.png"));
        assert!(written.exists());
        assert_eq!(recorded_args(tools.path(), "sips")[..3], ["-s", "format", "png"]);
    }

    #[test]
    fn failing_tool_is_an_image_error() {
        let tools = tempdir().unwrap();
        let magick = stub_tool(tools.path(), "magick", 1);
        let images = tempdir().unwrap();
        let input = images.path().join("scan.tiff");
        fs::write(&input, b"II*").unwrap();

        let err = ImageConverter::new()
            .with_tool(ImageTool::ImageMagick, &magick)
            .convert(&input, None)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Image(ref msg) if msg.contains("imagemagick")));
    }

    #[test]
    fn missing_tool_or_input_is_reported() {
        let images = tempdir().unwrap();
        let input = images.path().join("a.webp");
        fs::write(&input, b"RIFF").unwrap();

        let err = ImageConverter::new().convert(&input, None).unwrap_err();
        assert!(matches!(err, ConvertError::Image(ref msg) if msg.contains(".webp")));

        let err = ImageConverter::new()
            .convert(&images.path().join("absent.bmp"), None)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[test]
    fn hanging_tool_is_killed() {
        let tools = tempdir().unwrap();
        let script = tools.path().join("slow.sh");
        fs::write(&script, "#!/bin/sh\nexec sleep 5\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let images = tempdir().unwrap();
        let input = images.path().join("a.gif");
        fs::write(&input, b"GIF89a").unwrap();

        let err = ImageConverter::new()
            .with_tool(ImageTool::ImageMagick, &script)
            .with_timeout(Duration::from_millis(200))
            .convert(&input, None)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Timeout { .. }));
    }

    #[test]
    fn directory_conversion_only_touches_unsupported_formats() {
        let tools = tempdir().unwrap();
        let magick = stub_tool(tools.path(), "magick", 0);
        let images = tempdir().unwrap();
        for name in ["b.gif", "a.bmp", "photo.png", "notes.txt"] {
            fs::write(images.path().join(name), b"x").unwrap();
        }
        let out = images.path().join("converted");

        let outcomes = ImageConverter::new()
            .with_tool(ImageTool::ImageMagick, &magick)
            .convert_dir(images.path(), Some(&out))
            .unwrap();

        let inputs: Vec<_> = outcomes.iter().map(|o| o.input.clone()).collect();
        assert_eq!(inputs, vec![images.path().join("a.bmp"), images.path().join("b.gif")]);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        assert!(out.join("a.png").exists());
        assert!(out.join("b.png").exists());
        assert!(!needs_conversion(&images.path().join("photo.png")));
    }
}

#[cfg(not(all(unix, feature = "native-export")))]
#[test]
fn image_tests_skipped() {
    eprintln!("Skipping image conversion tests without unix and native-export");
}
