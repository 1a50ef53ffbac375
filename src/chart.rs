//! Price-path annotations and the inline SVG chart built from them.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Neutral,
    Increase,
    Decrease,
}

impl Trend {
    pub fn color(&self) -> &'static str {
        match self {
            Trend::Neutral => "grey",
            Trend::Increase => "green",
            Trend::Decrease => "red",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub index: usize,
    pub price: u32,
    pub trend: Trend,
}

/// Tag every point against its predecessor. An unchanged price counts as a
/// decrease; the first point is always neutral.
pub fn annotate(prices: &[u32]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(index, &price)| {
            let trend = match index {
                0 => Trend::Neutral,
                _ if price > prices[index - 1] => Trend::Increase,
                _ => Trend::Decrease,
            };
            PricePoint { index, price, trend }
        })
        .collect()
}

const WIDTH: f64 = 560.0;
const HEIGHT: f64 = 320.0;
const MARGIN: f64 = 48.0;

/// Line chart with colored markers, sized for the survey page.
pub fn render_svg(points: &[PricePoint]) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-label="Stock Price Movement">"#,
        w = WIDTH,
        h = HEIGHT
    );
    svg.push_str(&format!(
        r#"<text x="{}" y="20" text-anchor="middle" font-size="16">Stock Price Movement</text>"#,
        WIDTH / 2.0
    ));

    if points.is_empty() {
        svg.push_str("</svg>");
        return svg;
    }

    let min = points.iter().map(|p| p.price).min().unwrap_or(0) as f64;
    let max = points.iter().map(|p| p.price).max().unwrap_or(0) as f64;
    // Pad the y range so flat paths still render mid-chart
    let (lo, hi) = (min - 10.0, max + 10.0);
    let span_x = (points.len().max(2) - 1) as f64;

    let x_of = |i: usize| MARGIN + (i as f64) * (WIDTH - 2.0 * MARGIN) / span_x;
    let y_of = |price: u32| HEIGHT - MARGIN - (price as f64 - lo) * (HEIGHT - 2.0 * MARGIN) / (hi - lo);

    svg.push_str(&format!(
        r##"<line x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="#ccc"/><line x1="{m}" y1="{t}" x2="{m}" y2="{b}" stroke="#ccc"/>"##,
        m = MARGIN,
        b = HEIGHT - MARGIN,
        r = WIDTH - MARGIN,
        t = MARGIN
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="12">Stock Moves Over Time</text>"#,
        WIDTH / 2.0,
        HEIGHT - 10.0
    ));
    svg.push_str(&format!(
        r#"<text x="14" y="{y}" text-anchor="middle" font-size="12" transform="rotate(-90 14 {y})">Price (Rs.)</text>"#,
        y = HEIGHT / 2.0
    ));

    let line: Vec<String> = points
        .iter()
        .map(|p| format!("{:.1},{:.1}", x_of(p.index), y_of(p.price)))
        .collect();
    svg.push_str(&format!(
        r#"<polyline fill="none" stroke="black" stroke-width="2" points="{}"/>"#,
        line.join(" ")
    ));

    for p in points {
        let (x, y) = (x_of(p.index), y_of(p.price));
        svg.push_str(&format!(
            r#"<circle cx="{x:.1}" cy="{y:.1}" r="6" fill="{c}"><title>{price}</title></circle><text x="{x:.1}" y="{ty:.1}" text-anchor="middle" font-size="11">{price}</text><text x="{x:.1}" y="{bx:.1}" text-anchor="middle" font-size="10">{i}</text>"#,
            c = p.trend.color(),
            price = p.price,
            ty = y - 10.0,
            bx = HEIGHT - MARGIN + 14.0,
            i = p.index
        ));
    }

    svg.push_str("</svg>");
    svg
}
