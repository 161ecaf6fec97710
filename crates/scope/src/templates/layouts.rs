use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLES: &str = r#"
body{font-family:system-ui,-apple-system,Segoe UI,Roboto;padding:24px;background:#0b1117;color:#e5e7eb}
.grid{display:grid;gap:16px}
@media(min-width:900px){.grid{grid-template-columns:1fr 1fr}}
.card{background:#111827;border:1px solid #1f2937;border-radius:12px;padding:12px}
h2{margin:6px 0 12px;font-size:16px;color:#cbd5e1}
canvas{width:100%;height:340px}
a{color:#93c5fd}
"#;

pub fn base(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                script src="https://cdn.jsdelivr.net/npm/chart.js@4" {}
                style { (PreEscaped(STYLES)) }
            }
            body {
                nav {
                    a href="/" { "Dashboard" }
                    " · "
                    a href="/waves/" { "Waves" }
                    " · "
                    a href="/tides/" { "Tides" }
                    " · "
                    a href="/docs" { "API Docs" }
                }
                (content)
            }
        }
    }
}
