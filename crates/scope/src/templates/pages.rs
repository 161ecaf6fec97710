use maud::{html, Markup, PreEscaped};

use super::base;

/// Series feeding the dashboard charts, one entry per stored observation
#[derive(Debug, Default)]
pub struct DashboardData {
    pub times: Vec<String>,
    pub hs: Vec<Option<f64>>,
    pub tp: Vec<Option<f64>>,
    pub air_temp: Vec<Option<f64>>,
    pub sst: Vec<Option<f64>>,
}

/// Dashboard page - wave and temperature line charts over all stored rows
pub fn dashboard_page(location: &str, data: &DashboardData) -> Markup {
    base(
        &format!("SwellScope – {}", location),
        dashboard_content(location, data),
    )
}

fn dashboard_content(location: &str, data: &DashboardData) -> Markup {
    html! {
        h1 { "SwellScope – " (location) }
        div class="grid" {
            div class="card" {
                h2 { "Waves: Hs (m) and Tp (s)" }
                canvas id="waves" {}
            }
            div class="card" {
                h2 { "Temperatures: air × sea (°C)" }
                canvas id="temps" {}
            }
        }
        script { (PreEscaped(chart_script(data))) }
    }
}

// Nulls are kept in the datasets; Chart.js spanGaps bridges them.
fn chart_script(data: &DashboardData) -> String {
    format!(
        r#"
const times = {times};
const hs = {hs};
const tp = {tp};
const tair = {tair};
const sst = {sst};

function mkChart(id, labelA, dataA, labelB, dataB) {{
    const ctx = document.getElementById(id);
    new Chart(ctx, {{
        type: 'line',
        data: {{
            labels: times,
            datasets: [
                {{ label: labelA, data: dataA, spanGaps: true }},
                {{ label: labelB, data: dataB, spanGaps: true }}
            ]
        }},
        options: {{
            responsive: true,
            interaction: {{ mode: 'index', intersect: false }},
            scales: {{
                x: {{ ticks: {{ maxRotation: 0, autoSkip: true }} }}
            }}
        }}
    }});
}}

mkChart('waves', 'Hs (m)', hs, 'Tp (s)', tp);
mkChart('temps', 'Air (°C)', tair, 'Sea (°C)', sst);
"#,
        times = serde_json::to_string(&data.times).unwrap_or_else(|_| "[]".to_string()),
        hs = serde_json::to_string(&data.hs).unwrap_or_else(|_| "[]".to_string()),
        tp = serde_json::to_string(&data.tp).unwrap_or_else(|_| "[]".to_string()),
        tair = serde_json::to_string(&data.air_temp).unwrap_or_else(|_| "[]".to_string()),
        sst = serde_json::to_string(&data.sst).unwrap_or_else(|_| "[]".to_string()),
    )
}
