use tbviz::color::Rgb;
use tbviz::render::bitmap::{pixel_size, rasterize, save_png};
use tbviz::scene::{Highlight, Role, Scene, Shape, Style, TooltipContent};

fn square() -> Scene {
    let mut scene = Scene::new(40.0, 30.0, "square");
    scene.push(
        Role::Background,
        "bg",
        Shape::Rect { x: 0.0, y: 0.0, w: 40.0, h: 30.0 },
        Style::fill(Rgb::WHITE),
    );
    let id = scene.push(
        Role::Marker,
        "dot",
        Shape::Circle { center: (20.0, 15.0), r: 5.0 },
        Style::fill(Rgb::new(0, 0, 255)),
    );
    scene.attach_tooltip(
        id,
        TooltipContent { lines: vec!["blue".into()], offset: (0, 0) },
    );
    scene.highlight = Some(Highlight { stroke: Rgb::BLACK, stroke_width: 2.0 });
    scene
}

fn pixel(buf: &[u8], w: u32, x: u32, y: u32) -> [u8; 3] {
    let i = ((y * w + x) * 3) as usize;
    [buf[i], buf[i + 1], buf[i + 2]]
}

#[test]
fn shapes_land_in_the_buffer() {
    let scene = square();
    let (w, h) = pixel_size(&scene);
    assert_eq!((w, h), (40, 30));
    let mut buf = vec![0u8; (w * h * 3) as usize];
    rasterize(&scene, &mut buf, None).unwrap();
    assert_eq!(pixel(&buf, w, 1, 1), [255, 255, 255]);
    assert_eq!(pixel(&buf, w, 20, 15), [0, 0, 255]);
}

#[test]
fn hovered_mark_is_outlined() {
    let scene = square();
    let (w, h) = pixel_size(&scene);
    let mut plain = vec![0u8; (w * h * 3) as usize];
    let mut hovered = plain.clone();
    rasterize(&scene, &mut plain, None).unwrap();
    rasterize(&scene, &mut hovered, Some(tbviz::scene::MarkId(1))).unwrap();
    assert_ne!(plain, hovered);
}

#[test]
fn png_file_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("square.png");
    save_png(&square(), &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}
