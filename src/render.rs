use crate::packing::Packing;

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// Fill characters from sparse to dense, indexed by normalized value
/// density.
const DENSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Renders a packing as an ASCII grid: the disc outline as dots,
/// rectangles as boxes whose interior fill encodes value density.
pub fn render_packing(packing: &Packing) -> String {
    let radius = packing.radius();
    if radius <= 0.0 {
        return String::new();
    }
    let scale_x = MAX_WIDTH / (2.0 * radius);
    let scale_y = MAX_HEIGHT / (2.0 * radius);
    let grid_w = MAX_WIDTH as usize;
    let grid_h = MAX_HEIGHT as usize;

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    // world -> grid, y flipped so +y is up
    let to_gx = |x: f64| ((x + radius) * scale_x).round() as isize;
    let to_gy = |y: f64| ((radius - y) * scale_y).round() as isize;

    // disc outline
    for step in 0..360 {
        let angle = f64::from(step).to_radians();
        let gx = to_gx(radius * angle.cos());
        let gy = to_gy(radius * angle.sin());
        if gx >= 0 && gy >= 0 && (gy as usize) <= grid_h && (gx as usize) <= grid_w {
            grid[gy as usize][gx as usize] = '.';
        }
    }

    let max_density = packing
        .rects()
        .iter()
        .map(|r| r.density())
        .fold(0.0, f64::max);

    for rect in packing.rects() {
        let x0 = to_gx(rect.x_min).max(0) as usize;
        let x1 = to_gx(rect.x_max).max(0) as usize;
        // y flips: y_max maps to the upper (smaller) row
        let y0 = to_gy(rect.y_max).max(0) as usize;
        let y1 = to_gy(rect.y_min).max(0) as usize;
        if x1 <= x0 || y1 <= y0 {
            continue;
        }

        let fill = if max_density > 0.0 {
            let norm = (rect.density() / max_density).clamp(0.0, 1.0);
            DENSITY_RAMP[(norm * (DENSITY_RAMP.len() - 1) as f64).round() as usize]
        } else {
            DENSITY_RAMP[0]
        };

        for gy in y0..=y1.min(grid_h) {
            for gx in x0..=x1.min(grid_w) {
                let on_h = gy == y0 || gy == y1;
                let on_v = gx == x0 || gx == x1;
                grid[gy][gx] = if on_h || on_v {
                    border_char(on_h, on_v, grid[gy][gx])
                } else {
                    fill
                };
            }
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

fn border_char(horizontal: bool, vertical: bool, existing: char) -> char {
    if horizontal && vertical {
        '+'
    } else if horizontal {
        if existing == '|' || existing == '+' { '+' } else { '-' }
    } else if existing == '-' || existing == '+' {
        '+'
    } else {
        '|'
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RectangleType;

    #[test]
    fn test_render_empty_packing_draws_disc() {
        let output = render_packing(&Packing::new(10.0));
        assert!(output.contains('.'));
        assert!(!output.contains('+'));
    }

    #[test]
    fn test_render_single_rect() {
        let mut packing = Packing::new(10.0);
        assert!(packing.try_add_new(RectangleType::new(8.0, 5.0, 4.0).place(-4.0, -2.5)));
        let output = render_packing(&packing);
        assert!(output.contains('+'));
        assert!(output.contains('-'));
        assert!(output.contains('|'));
        // sole rectangle has maximum density, so the densest fill
        assert!(output.contains('@'));
    }

    #[test]
    fn test_render_density_ordering() {
        let mut packing = Packing::new(10.0);
        // same footprint, different value: distinct fills
        assert!(packing.try_add_new(RectangleType::new(4.0, 4.0, 16.0).place(-6.0, -2.0)));
        assert!(packing.try_add_new(RectangleType::new(4.0, 4.0, 2.0).place(1.0, -2.0)));
        let output = render_packing(&packing);
        assert!(output.contains('@'));
        // low-density rect (1/8 of max) falls near the bottom of the ramp
        assert!(output.contains(':'));
    }

    #[test]
    fn test_render_zero_radius() {
        assert_eq!(render_packing(&Packing::new(0.0)), String::new());
    }
}
