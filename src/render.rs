//! Server-rendered HTML for the participant page.

use crate::chart::render_svg;
use crate::session::Choice;
use crate::survey::SessionView;

const INTRO: &str = r#"<div style="background: linear-gradient(90deg, #f0f2f6, #d9e2ec); padding: 20px; border-radius: 10px;">
<h2 style="text-align:center;">📈 Stock Simulator</h2>
<p style="text-align:center;">
You are going to play a game. At every stage of a stock’s price movement, you will be forced to take a decision on whether to <b>buy</b>, <b>hold</b>, or <b>sell</b>.
The assumption is that at every stage you have enough money to buy and enough stock to sell.
</p>
</div>"#;

fn export_form() -> &'static str {
    r#"<form method="post" action="/export" style="margin:16px 0;">
<label>Enter teacher password to enable CSV download (hidden from students)
<input type="password" name="password"></label>
<button type="submit">Download Responses CSV</button>
</form>"#
}

pub fn session_page(view: &SessionView, export_enabled: bool) -> String {
    let mut body = String::from(INTRO);
    if export_enabled {
        body.push_str(export_form());
    }

    let base = format!("/session/{}", view.session_id);

    match &view.outcome {
        None => {
            body.push_str(&format!("<p><b>{}</b></p>", view.narrative.unwrap_or_default()));
            body.push_str(&render_svg(&view.chart));
            body.push_str(r#"<div style="display:flex; gap:12px;">"#);
            for choice in Choice::ALL {
                body.push_str(&format!(
                    r#"<form method="post" action="{base}/choice"><button type="submit" name="choice" value="{c}">{c}</button></form>"#,
                    base = base,
                    c = choice
                ));
            }
            body.push_str("</div>");
        }
        Some(outcome) => {
            body.push_str(&render_svg(&view.chart));
            body.push_str(&format!(
                r#"<p style="background:#e6f4ea; padding:12px; border-radius:6px;">The game ends! Final stock price: Rs.{}</p>"#,
                outcome.final_price
            ));
            if !view.results.is_empty() {
                body.push_str(
                    "<table border=\"1\" cellpadding=\"6\"><tr><th></th><th>Previous Move</th><th>UpMove Forecast</th><th>Down Move Forecast</th><th>Your Action</th></tr>",
                );
                for row in &view.results {
                    body.push_str(&format!(
                        "<tr><th>{}</th><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        row.label, row.previous_move, row.up_forecast, row.down_forecast, row.action
                    ));
                }
                body.push_str("</table>");
            }
            body.push_str(&format!(
                r#"<form method="post" action="{}/reset"><button type="submit">Play Again</button></form>"#,
                base
            ));
        }
    }

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Stock Simulator</title></head><body style=\"max-width:720px; margin:auto; font-family:sans-serif;\">{}</body></html>",
        body
    )
}
