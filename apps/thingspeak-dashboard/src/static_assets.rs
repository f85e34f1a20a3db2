use axum::extract::Request;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Duration;

const REFRESH_PLACEHOLDER: &str = "__REFRESH_INTERVAL_MS__";

const DASHBOARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="pt-br">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Dashboard IoT Live</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
      * { margin: 0; padding: 0; box-sizing: border-box; }
      body {
        font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
        background: #e0f7fa;
        color: #333;
        min-height: 100vh;
        display: flex;
        flex-direction: column;
      }
      header {
        padding: 20px;
        background: #3b5c76;
        color: #fff;
        box-shadow: 0 4px 6px rgba(0, 0, 0, 0.15);
        text-align: center;
      }
      header h1 { font-size: 2.2rem; margin-bottom: 8px; }
      header p { font-size: 1rem; opacity: 0.9; }
      .charts-wrapper {
        display: grid;
        grid-template-columns: repeat(auto-fit, minmax(350px, 1fr));
        gap: 25px;
        padding: 30px;
        flex: 1;
      }
      .chart-container {
        background: #fff;
        padding: 20px;
        border-radius: 14px;
        box-shadow: 0 8px 20px rgba(0, 0, 0, 0.08);
        animation: fadeIn 1s ease;
        transition: transform 0.3s, box-shadow 0.3s;
      }
      .chart-container:hover {
        transform: translateY(-6px);
        box-shadow: 0 12px 24px rgba(0, 0, 0, 0.12);
      }
      .chart-container h2 { margin-bottom: 15px; font-size: 1.4rem; color: #7bafd4; }
      footer {
        text-align: center;
        padding: 15px;
        background-color: #7bafd4;
        color: #fff;
        font-size: 0.9rem;
      }
      @keyframes fadeIn {
        from { opacity: 0; transform: translateY(10px); }
        to { opacity: 1; transform: translateY(0); }
      }
    </style>
  </head>
  <body>
    <header>
      <h1>Dashboard IoT - Tempo Real</h1>
      <p id="refreshNote"></p>
    </header>

    <div class="charts-wrapper">
      <div class="chart-container">
        <h2>Umidade (%)</h2>
        <canvas id="chartUmidade"></canvas>
      </div>
      <div class="chart-container">
        <h2>Temperatura (°C)</h2>
        <canvas id="chartTemperatura"></canvas>
      </div>
      <div class="chart-container">
        <h2>Dashboard Combinado</h2>
        <canvas id="chartCombined"></canvas>
      </div>
    </div>

    <footer>Dados do canal ThingSpeak configurado no servidor</footer>

    <script>
      const REFRESH_INTERVAL_MS = __REFRESH_INTERVAL_MS__;

      const HUMIDITY_STYLE = { label: 'Umidade (%)', borderColor: '#0288d1', backgroundColor: 'rgba(2,136,209,0.2)', fill: true };
      const TEMPERATURE_STYLE = { label: 'Temperatura (°C)', borderColor: '#e53935', backgroundColor: 'rgba(229,57,53,0.2)', fill: true };
      const CHART_OPTIONS = {
        responsive: true,
        plugins: { legend: { display: true }, tooltip: { mode: 'index', intersect: false } },
        scales: { y: { beginAtZero: true } }
      };

      function lineChart(canvasId, styles) {
        const ctx = document.getElementById(canvasId).getContext('2d');
        return new Chart(ctx, {
          type: 'line',
          data: { labels: [], datasets: styles.map(style => ({ ...style, data: [] })) },
          options: CHART_OPTIONS
        });
      }

      const chartUmidade = lineChart('chartUmidade', [HUMIDITY_STYLE]);
      const chartTemperatura = lineChart('chartTemperatura', [TEMPERATURE_STYLE]);
      const chartCombined = lineChart('chartCombined', [HUMIDITY_STYLE, TEMPERATURE_STYLE]);

      document.getElementById('refreshNote').textContent =
        'Atualização automática a cada ' + Math.round(REFRESH_INTERVAL_MS / 1000) + ' segundos';

      // Ticks may overlap when /data is slow; only a response newer than the
      // last applied one may touch the charts.
      let requestedGeneration = 0;
      let appliedGeneration = 0;

      async function updateCharts() {
        const generation = ++requestedGeneration;
        try {
          const res = await fetch('/data', { cache: 'no-store' });
          if (!res.ok) {
            throw new Error('HTTP ' + res.status);
          }
          const { temperatura, umidade, tempo } = await res.json();
          if (generation <= appliedGeneration) {
            return;
          }
          appliedGeneration = generation;

          chartUmidade.data.labels = tempo;
          chartUmidade.data.datasets[0].data = umidade;
          chartUmidade.update();

          chartTemperatura.data.labels = tempo;
          chartTemperatura.data.datasets[0].data = temperatura;
          chartTemperatura.update();

          chartCombined.data.labels = tempo;
          chartCombined.data.datasets[0].data = umidade;
          chartCombined.data.datasets[1].data = temperatura;
          chartCombined.update();
        } catch (err) {
          console.error('Erro ao atualizar gráficos:', err);
        }
      }

      updateCharts();
      setInterval(updateCharts, REFRESH_INTERVAL_MS);
    </script>
  </body>
</html>
"#;

/// The dashboard document. Rendered once at startup; readings only ever
/// reach the browser through `/data`.
#[derive(Debug, Clone)]
pub struct DashboardPage {
    html: String,
}

impl DashboardPage {
    pub fn render(refresh_interval: Duration) -> Self {
        let refresh_ms = refresh_interval.as_millis().max(1);
        Self {
            html: DASHBOARD_TEMPLATE.replace(REFRESH_PLACEHOLDER, &refresh_ms.to_string()),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Marks the page and the series endpoints uncacheable so a reload always
/// shows fresh readings.
pub async fn apply_cache_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    if response.headers().contains_key(CACHE_CONTROL) {
        return response;
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("text/html") || content_type.starts_with("application/json") {
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}
