use crate::models::CampaignSeed;

pub fn render_index(seeds: &[CampaignSeed]) -> String {
    let options: String = seeds
        .iter()
        .map(|seed| format!(r#"<option value="{}">{}</option>"#, seed.id, seed.name))
        .collect::<Vec<_>>()
        .join("\n          ");
    INDEX_HTML.replace("{{CAMPAIGN_OPTIONS}}", &options)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Campaign Bid Simulator</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --up: #1f9d6b;
      --hold: #c79a1e;
      --down: #d8434e;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1080px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: center;
    }

    select, input, textarea {
      font: inherit;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 8px 12px;
      background: white;
    }

    textarea {
      width: 100%;
      min-height: 120px;
      font-family: monospace;
      font-size: 0.85rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.85rem;
      background: white;
      border-radius: 18px;
      overflow: hidden;
    }

    th, td {
      padding: 8px 10px;
      text-align: right;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    th:first-child, td:first-child {
      text-align: left;
    }

    tr.forecast td {
      color: var(--accent-2);
    }

    .Scale.Up { color: var(--up); }
    .Hold { color: var(--hold); }
    .Scale.Down { color: var(--down); }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
    }

    .status.error {
      color: var(--down);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Campaign Bid Simulator</h1>
      <p class="subtitle">Twelve weeks of history, twelve weeks of projected cost per outcome.</p>
    </header>

    <section class="controls">
      <select id="campaign">
          {{CAMPAIGN_OPTIONS}}
      </select>
      <select id="metric">
        <option value="cpi">CPI</option>
        <option value="cpa">CPA</option>
        <option value="cprt">CPRT</option>
        <option value="cpft">CPFT</option>
      </select>
      <label>Bid +<input id="bid" type="number" min="5" max="100" step="5" value="20" />%</label>
    </section>

    <section class="panel" id="summary"></section>

    <section>
      <h2>Timeline</h2>
      <table id="timeline"></table>
    </section>

    <section>
      <h2>Network response</h2>
      <table id="network"></table>
    </section>

    <section>
      <h2>Upload weekly data</h2>
      <textarea id="csv" placeholder="week,impressions,clicks,installs,spend,cpi,cvr"></textarea>
      <div class="controls">
        <button id="upload">Use CSV</button>
        <button id="reset">Back to demo data</button>
      </div>
      <p class="status" id="status"></p>
    </section>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    const fmt = (n) => n == null ? '—' : Number(n).toLocaleString('en-IN', { maximumFractionDigits: 2 });

    const setStatus = (message, tone) => {
      const el = $('status');
      el.textContent = message;
      el.className = `status ${tone || ''}`;
    };

    const query = () => {
      const params = new URLSearchParams({
        campaign: $('campaign').value,
        metric: $('metric').value,
        bid: $('bid').value,
      });
      return params.toString();
    };

    const getJson = async (path) => {
      const res = await fetch(`${path}?${query()}`);
      if (!res.ok) {
        throw new Error(await res.text());
      }
      return res.json();
    };

    const renderSummary = (s) => {
      const cards = [
        ['Historical avg', fmt(s.historicalAverage)],
        ['Forecast avg', fmt(s.forecastAverage)],
        ['Change', s.deltaPct == null ? '—' : `${s.deltaPct}%`],
        ['Target', fmt(s.target)],
        ['Historical volume', fmt(s.historicalVolume)],
      ];
      $('summary').innerHTML = cards
        .map(([label, value]) => `<div class="stat"><div class="label">${label}</div><div class="value">${value}</div></div>`)
        .join('');
    };

    const renderTimeline = (rows, metric) => {
      const head = '<tr><th>Week</th><th>Month</th><th>Actual</th><th>Optimistic</th><th>Pessimistic</th><th>Baseline</th><th>Bid</th><th>Budget</th><th>Action</th></tr>';
      const body = rows.map((r) => {
        const a = r.actual || {};
        const f = r.forecast || {};
        const m = f[metric] || {};
        return `<tr class="${r.phase}"><td>${r.label}</td><td>${r.month}</td><td>${fmt(a[metric])}</td>` +
          `<td>${fmt(m.optimistic)}</td><td>${fmt(m.pessimistic)}</td><td>${fmt(m.baseline)}</td>` +
          `<td>${fmt(f.recBid)}</td><td>${fmt(f.recBudget)}</td><td class="${f.bidAction || ''}">${f.bidAction || ''}</td></tr>`;
      }).join('');
      $('timeline').innerHTML = head + body;
    };

    const renderNetwork = (rows) => {
      const head = '<tr><th>Network</th><th>Volume</th><th>CVR</th><th>Base</th><th>New</th><th>Δ%</th><th>CPM</th><th>CPC</th><th>Quality</th></tr>';
      const body = rows.map((r) =>
        `<tr><td>${r.network}</td><td>+${r.volumeGainPct}%</td><td>${r.cvrBoostPct}%</td><td>${fmt(r.metricBase)}</td>` +
        `<td>${fmt(r.metricNew)}</td><td>${r.metricDeltaPct}%</td><td>${fmt(r.cpmNew)}</td><td>${fmt(r.cpcNew)}</td><td>${r.qualityScore}</td></tr>`
      ).join('');
      $('network').innerHTML = head + body;
    };

    const refresh = async () => {
      const metric = $('metric').value;
      const [timeline, summary, network] = await Promise.all([
        getJson('/api/timeline'),
        getJson('/api/summary'),
        getJson('/api/network'),
      ]);
      renderTimeline(timeline, metric);
      renderSummary(summary);
      renderNetwork(network);
    };

    $('upload').addEventListener('click', async () => {
      const res = await fetch('/api/upload', { method: 'POST', body: $('csv').value });
      if (!res.ok) {
        setStatus(await res.text(), 'error');
        return;
      }
      const info = await res.json();
      setStatus(`Loaded ${info.rows} weeks (${info.firstWeek} to ${info.lastWeek})`, 'ok');
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    $('reset').addEventListener('click', async () => {
      await fetch('/api/upload', { method: 'DELETE' });
      setStatus('Using demo data', 'ok');
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    ['campaign', 'metric', 'bid'].forEach((id) => {
      $(id).addEventListener('change', () => refresh().catch((err) => setStatus(err.message, 'error')));
    });

    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
