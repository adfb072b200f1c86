use super::*;

fn surface(w: u32, h: u32) -> CpuSurface {
    let mut s = CpuSurface::new(Rc::new(RefCell::new(FontLibrary::empty())));
    s.set_pixel_size(w, h);
    s
}

fn assert_px(frame: &FrameRGBA, x: u32, y: u32, want: [u8; 4]) {
    let got = frame.pixel(x, y).unwrap();
    for i in 0..4 {
        assert!(
            got[i].abs_diff(want[i]) <= 1,
            "pixel ({x},{y}) = {got:?}, want {want:?}"
        );
    }
}

#[test]
fn fill_rect_paints_only_covered_pixels() {
    let mut s = surface(4, 4);
    s.set_fill_style("#ff0000");
    s.fill_rect(0.0, 0.0, 2.0, 4.0);
    let f = s.read_pixels();
    assert_px(&f, 0, 0, [255, 0, 0, 255]);
    assert_px(&f, 1, 3, [255, 0, 0, 255]);
    assert_px(&f, 3, 0, [0, 0, 0, 0]);
}

#[test]
fn global_alpha_scales_fill() {
    let mut s = surface(2, 2);
    s.set_fill_style("blue");
    s.set_global_alpha(0.5);
    s.fill_rect(0.0, 0.0, 2.0, 2.0);
    assert_px(&s.read_pixels(), 1, 1, [0, 0, 128, 128]);
}

#[test]
fn out_of_range_alpha_is_ignored() {
    let mut s = surface(1, 1);
    s.set_global_alpha(0.25);
    s.set_global_alpha(1.5);
    s.set_global_alpha(f64::NAN);
    assert_eq!(s.global_alpha(), 0.25);
}

#[test]
fn transform_and_save_restore() {
    let mut s = surface(4, 1);
    s.set_fill_style("white");
    s.save();
    s.translate(2.0, 0.0);
    s.fill_rect(0.0, 0.0, 1.0, 1.0);
    s.restore();
    s.fill_rect(0.0, 0.0, 1.0, 1.0);
    let f = s.read_pixels();
    assert_px(&f, 0, 0, [255, 255, 255, 255]);
    assert_px(&f, 1, 0, [0, 0, 0, 0]);
    assert_px(&f, 2, 0, [255, 255, 255, 255]);
}

#[test]
fn scaled_transform_covers_device_pixels() {
    let mut s = surface(4, 4);
    s.scale(2.0, 2.0);
    s.set_fill_style("lime");
    s.fill_rect(0.0, 0.0, 1.0, 1.0);
    let f = s.read_pixels();
    assert_px(&f, 1, 1, [0, 255, 0, 255]);
    assert_px(&f, 2, 2, [0, 0, 0, 0]);
}

#[test]
fn clear_rect_erases_committed_pixels() {
    let mut s = surface(4, 1);
    s.set_fill_style("red");
    s.fill_rect(0.0, 0.0, 4.0, 1.0);
    s.clear_rect(0.0, 0.0, 2.0, 1.0);
    let f = s.read_pixels();
    assert_px(&f, 1, 0, [0, 0, 0, 0]);
    assert_px(&f, 2, 0, [255, 0, 0, 255]);
}

#[test]
fn resize_clears_content_and_state() {
    let mut s = surface(2, 2);
    s.set_fill_style("red");
    s.translate(5.0, 5.0);
    s.fill_rect(0.0, 0.0, 2.0, 2.0);
    s.set_pixel_size(3, 3);
    assert_eq!(s.pixel_size(), (3, 3));
    assert!(s.read_pixels().data.iter().all(|&b| b == 0));
    s.fill_rect(0.0, 0.0, 1.0, 1.0);
    assert_px(&s.read_pixels(), 0, 0, [0, 0, 0, 255]);
}

#[test]
fn path_fill_covers_triangle_interior() {
    let mut s = surface(8, 8);
    s.set_fill_style("white");
    s.begin_path();
    s.move_to(0.0, 0.0);
    s.line_to(8.0, 0.0);
    s.line_to(0.0, 8.0);
    s.close_path();
    s.fill();
    let f = s.read_pixels();
    assert_px(&f, 1, 1, [255, 255, 255, 255]);
    assert_px(&f, 7, 7, [0, 0, 0, 0]);
}

#[test]
fn full_arc_fills_circle_center() {
    let mut s = surface(10, 10);
    s.set_fill_style("red");
    s.begin_path();
    s.arc(5.0, 5.0, 4.0, 0.0, TAU, false);
    s.fill();
    let f = s.read_pixels();
    assert_px(&f, 5, 5, [255, 0, 0, 255]);
    assert_px(&f, 0, 0, [0, 0, 0, 0]);
}

#[test]
fn draw_image_scales_source_surface() {
    let mut src = surface(2, 2);
    src.set_fill_style("red");
    src.fill_rect(0.0, 0.0, 2.0, 2.0);

    let mut dst = surface(4, 4);
    dst.draw_image(
        ImageSource::Surface(&mut src),
        Rect::new(0.0, 0.0, 2.0, 2.0),
        Rect::new(0.0, 0.0, 4.0, 4.0),
    );
    let f = dst.read_pixels();
    assert_px(&f, 1, 1, [255, 0, 0, 255]);
    assert_px(&f, 3, 3, [255, 0, 0, 255]);
}

#[test]
fn draw_image_into_partial_destination() {
    let img = ImageData {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![0, 0, 255, 255]),
    };
    let mut dst = surface(4, 1);
    dst.draw_image(
        ImageSource::Image(&img),
        Rect::new(0.0, 0.0, 1.0, 1.0),
        Rect::new(0.0, 0.0, 2.0, 1.0),
    );
    let f = dst.read_pixels();
    assert_px(&f, 0, 0, [0, 0, 255, 255]);
    assert_px(&f, 3, 0, [0, 0, 0, 0]);
}

#[test]
fn text_without_fonts_draws_nothing() {
    let mut s = surface(4, 4);
    s.fill_text("hello", 0.0, 4.0, None);
    assert!(s.read_pixels().data.iter().all(|&b| b == 0));
}

#[test]
fn encode_png_has_signature() {
    let mut s = surface(2, 2);
    let bytes = s.encode(ImageFormat::Png, None).unwrap();
    assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
}

#[test]
fn empty_surface_cannot_encode() {
    let mut s = surface(0, 0);
    assert!(s.encode(ImageFormat::Png, None).is_none());
}

#[test]
fn arc_sweep_follows_direction() {
    assert_eq!(arc_sweep(0.0, TAU, false), TAU);
    assert_eq!(arc_sweep(0.0, -TAU, true), -TAU);
    assert!((arc_sweep(0.0, -1.0, false) - (TAU - 1.0)).abs() < 1e-12);
    assert!((arc_sweep(0.0, 1.0, true) - (1.0 - TAU)).abs() < 1e-12);
}

#[test]
fn line_stroke_has_butt_caps() {
    let mut s = surface(32, 32);
    s.set_stroke_style("#ff0000");
    s.set_line_width(4.0);
    s.begin_path();
    s.move_to(10.0, 10.0);
    s.line_to(20.0, 10.0);
    s.stroke();
    let f = s.read_pixels();
    assert_px(&f, 10, 9, [255, 0, 0, 255]);
    assert_px(&f, 19, 10, [255, 0, 0, 255]);
    assert_px(&f, 8, 10, [0, 0, 0, 0]);
    assert_px(&f, 21, 10, [0, 0, 0, 0]);
}

#[test]
fn stroke_rect_has_square_corners() {
    let mut s = surface(16, 16);
    s.set_stroke_style("red");
    s.set_line_width(4.0);
    s.stroke_rect(4.0, 4.0, 8.0, 8.0);
    let f = s.read_pixels();
    assert_px(&f, 2, 2, [255, 0, 0, 255]);
    assert_px(&f, 13, 13, [255, 0, 0, 255]);
    assert_px(&f, 1, 1, [0, 0, 0, 0]);
    assert_px(&f, 8, 8, [0, 0, 0, 0]);
}

#[test]
fn stroke_width_follows_non_uniform_scale() {
    let mut s = surface(32, 16);
    s.scale(4.0, 1.0);
    s.set_stroke_style("white");

    s.set_line_width(1.0);
    s.begin_path();
    s.move_to(5.0, 0.0);
    s.line_to(5.0, 10.0);
    s.stroke();

    s.set_line_width(2.0);
    s.begin_path();
    s.move_to(0.0, 12.0);
    s.line_to(5.0, 12.0);
    s.stroke();

    let f = s.read_pixels();
    let white = [255, 255, 255, 255];
    let clear = [0, 0, 0, 0];
    assert_px(&f, 18, 5, white);
    assert_px(&f, 21, 5, white);
    assert_px(&f, 17, 5, clear);
    assert_px(&f, 22, 5, clear);
    assert_px(&f, 10, 11, white);
    assert_px(&f, 10, 12, white);
    assert_px(&f, 10, 10, clear);
    assert_px(&f, 10, 13, clear);
}

#[test]
fn stroke_under_singular_transform_draws_nothing() {
    let mut s = surface(8, 8);
    s.scale(0.0, 1.0);
    s.set_stroke_style("red");
    s.begin_path();
    s.move_to(1.0, 1.0);
    s.line_to(1.0, 6.0);
    s.stroke();
    assert!(s.read_pixels().data.iter().all(|&b| b == 0));
}
