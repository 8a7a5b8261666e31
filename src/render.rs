use crate::types::Bar;

const MAX_WIDTH: f64 = 80.0;

pub fn render_bar(bar_length: u32, kerf: u32, bar: &Bar) -> String {
    if bar_length == 0 {
        return String::new();
    }
    let scale = MAX_WIDTH / bar_length as f64;
    let grid_w = (bar_length as f64 * scale).round() as usize;
    if grid_w == 0 {
        return String::new();
    }

    let mut top = vec!['-'; grid_w + 1];
    let mut mid = vec![' '; grid_w + 1];
    let mut bot = vec!['-'; grid_w + 1];

    // Segment edges; the bar's own ends are boundaries too
    let mut boundaries = vec![0, grid_w];
    let mut segments: Vec<(usize, usize, u32)> = Vec::new();
    let mut offset = 0u32;
    for &length in &bar.combo {
        let seg_start = scaled(offset, scale).min(grid_w);
        let seg_end = scaled(offset + length, scale).min(grid_w);
        boundaries.push(seg_start);
        boundaries.push(seg_end);
        segments.push((seg_start, seg_end, length));
        offset += length + kerf;
    }

    for &x in &boundaries {
        top[x] = '+';
        bot[x] = '+';
        mid[x] = '|';
    }

    // Label each piece with its length when the segment is wide enough;
    // the trailing waste segment stays blank
    for &(start, end, length) in &segments {
        let label: Vec<char> = length.to_string().chars().collect();
        let width = end.saturating_sub(start);
        if width > label.len() + 1 {
            let label_x = start + (width - label.len()) / 2;
            for (i, &ch) in label.iter().enumerate() {
                let x = label_x + i;
                if x > start && x < end {
                    mid[x] = ch;
                }
            }
        }
    }

    let mut result = String::new();
    for row in [&top, &mid, &bot] {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

fn scaled(v: u32, scale: f64) -> usize {
    (v as f64 * scale).round() as usize
}
