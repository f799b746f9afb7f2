use super::*;

fn write_png(path: &Path, w: u32, h: u32, px: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    img.save(path).unwrap();
}

#[test]
fn resolve_asset_distinguishes_found_and_missing() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("a.png");
    write_png(&p, 2, 2, [255, 0, 0, 255]);

    assert_eq!(resolve_asset(Some(&p)), AssetRef::Found(p.clone()));
    let absent = dir.path().join("nope.png");
    assert_eq!(resolve_asset(Some(&absent)), AssetRef::Missing);
    assert_eq!(resolve_asset(Some(dir.path())), AssetRef::Missing);
    assert_eq!(resolve_asset(None), AssetRef::Missing);
}

#[test]
fn or_else_prefers_found() {
    let found = AssetRef::Found(PathBuf::from("x"));
    assert_eq!(found.clone().or_else(|| AssetRef::Missing), found);
    assert_eq!(AssetRef::Missing.or_else(|| found.clone()), found);
}

#[test]
fn load_premultiplies_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("half.png");
    write_png(&p, 1, 1, [200, 100, 50, 128]);
    let img = PreparedImage::load(&p).unwrap();
    assert_eq!(img.rgba8_premul.as_slice(), &[100, 50, 25, 128]);
}

#[test]
fn load_fit_width_scales_and_dims() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bg.png");
    write_png(&p, 40, 20, [200, 200, 200, 255]);
    let img = PreparedImage::load_fit_width(&p, 80, 0.8).unwrap();
    assert_eq!((img.width, img.height), (80, 40));
    assert_eq!(img.rgba8_premul.len(), 80 * 40 * 4);
    assert_eq!(&img.rgba8_premul[..4], &[160, 160, 160, 255]);
}

#[test]
fn load_reports_undecodable_files() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.png");
    std::fs::write(&p, b"not an image").unwrap();
    assert!(PreparedImage::load(&p).is_err());
}

#[test]
fn scaled_height_keeps_aspect() {
    assert_eq!(scaled_height(1920, 1080, 1280), 720);
    assert_eq!(scaled_height(0, 10, 10), 1);
    assert_eq!(scaled_height(1000, 1, 10), 1);
}
