use axum::{
    http::header,
    response::{Html, IntoResponse},
};

pub async fn dashboard() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Html(DASHBOARD_HTML),
    )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mussel Farm Dashboard</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
    <style>
        body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1100px; padding: 1rem; color: #1e293b; }
        section { border: 1px solid #e2e8f0; border-radius: 0.5rem; padding: 1rem; margin-bottom: 1rem; }
        .readout { display: flex; gap: 2rem; font-size: 1.25rem; }
        .row { display: flex; gap: 0.5rem; align-items: center; flex-wrap: wrap; margin-bottom: 0.5rem; }
        #lampToggle.on { background: #facc15; }
        canvas { max-height: 260px; }
    </style>
</head>
<body>
    <h1>Mussel Farm</h1>

    <section>
        <div class="readout">
            <div>Temperature: <b id="temperature">--</b> °C</div>
            <div>Pump: <b id="pumpSpeed">--</b> %</div>
            <div>OD: <b id="odValue">--</b></div>
        </div>
    </section>

    <section>
        <div class="row">
            <label>Target temperature <input type="range" id="targetTemp" min="0" max="40" step="0.5"></label>
            <span id="targetTempValue">--</span>
        </div>
        <div class="row">
            <label>P <input type="number" id="pid_p" step="0.01"></label>
            <label>I <input type="number" id="pid_i" step="0.01"></label>
            <label>D <input type="number" id="pid_d" step="0.01"></label>
            <button id="lampToggle">--</button>
        </div>
    </section>

    <section>
        <div class="row">
            <label>From <input type="date" id="fromDay"> <input type="time" id="fromTime"></label>
            <span id="toFields"><label>To <input type="date" id="toDay"> <input type="time" id="toTime"></label></span>
            <label><input type="checkbox" id="liveMode"> Live</label>
            <button id="fetchBtn">Fetch</button>
        </div>
        <canvas id="temperatureChart"></canvas>
        <button data-csv="temperature">Download CSV</button>
        <canvas id="od_valueChart"></canvas>
        <button data-csv="od_value">Download CSV</button>
        <canvas id="pump_speedChart"></canvas>
        <button data-csv="pump_speed">Download CSV</button>
    </section>

    <script>
        const $ = (id) => document.getElementById(id);
        const series = {
            temperature: ['Temperature (°C)', 'rgba(255, 0, 0, 1)'],
            od_value: ['Algae Concentration (cells/mL)', 'rgba(0, 128, 0, 1)'],
            pump_speed: ['Pump Speed (%)', 'rgba(0, 0, 255, 1)'],
        };
        const charts = {};
        for (const [key, [label, color]] of Object.entries(series)) {
            charts[key] = new Chart($(key + 'Chart'), {
                type: 'line',
                data: { labels: [], datasets: [{ label, borderColor: color, data: [], tension: 0.3, fill: false }] },
                options: { animation: false, scales: { x: { title: { display: true, text: 'Time' } }, y: { beginAtZero: true } } },
            });
        }
        let revision = -1;

        async function api(method, path, body) {
            const res = await fetch('/api' + path, {
                method,
                headers: body ? { 'Content-Type': 'application/json' } : {},
                body: body ? JSON.stringify(body) : undefined,
            });
            if (!res.ok) throw new Error((await res.json()).error);
            return res.json();
        }

        function render(state) {
            $('liveMode').checked = state.live.enabled;
            $('toFields').style.visibility = state.live.enabled ? 'hidden' : 'visible';
            if (state.revision === revision) return;
            revision = state.revision;
            for (const key of Object.keys(series)) {
                charts[key].data.labels = state.labels;
                charts[key].data.datasets[0].data = state[key];
                charts[key].update();
            }
        }

        function range() {
            return { from_day: $('fromDay').value, from_time: $('fromTime').value, to_day: $('toDay').value, to_time: $('toTime').value };
        }

        async function refreshStatus() {
            try {
                const s = await api('GET', '/status');
                $('temperature').innerText = s.temperature;
                $('pumpSpeed').innerText = s.pump_speed;
                $('odValue').innerText = s.od_value;
                $('lampToggle').textContent = s.lamp_state;
                $('lampToggle').classList.toggle('on', s.lamp_state === 'ON');
            } catch (e) { console.error('status', e); }
        }

        async function loadSettings() {
            try {
                const s = await api('GET', '/settings');
                $('targetTemp').value = s.target_temp;
                $('targetTempValue').innerText = s.target_temp;
                for (const f of ['pid_p', 'pid_i', 'pid_d']) $(f).value = s[f];
            } catch (e) { console.error('settings', e); }
        }

        function editSetting(field, value) {
            api('PUT', '/settings/' + field, { value: parseFloat(value) }).catch((e) => console.error(field, e));
        }

        $('targetTemp').addEventListener('change', () => {
            $('targetTempValue').innerText = $('targetTemp').value;
            editSetting('target_temp', $('targetTemp').value);
        });
        for (const f of ['pid_p', 'pid_i', 'pid_d']) $(f).addEventListener('change', () => editSetting(f, $(f).value));
        $('lampToggle').addEventListener('click', async () => {
            try { await api('POST', '/lamp/toggle'); } catch (e) { console.error('lamp', e); }
            refreshStatus();
        });
        $('liveMode').addEventListener('change', (e) => {
            api('PUT', '/live-mode', { enabled: e.target.checked, ...range() }).then(render).catch((e) => console.error('live', e));
        });
        $('fetchBtn').addEventListener('click', () => {
            api('POST', '/charts/fetch', range()).then(render).catch((e) => console.error('fetch', e));
        });
        document.querySelectorAll('[data-csv]').forEach((b) => b.addEventListener('click', () => {
            window.location = '/api/charts/' + b.dataset.csv + '/csv';
        }));

        api('POST', '/charts/fetch', range()).then(render).catch((e) => console.error('fetch', e));
        loadSettings();
        refreshStatus();
        setInterval(refreshStatus, 2000);
        setInterval(() => api('GET', '/charts').then(render).catch(() => {}), 3000);
    </script>
</body>
</html>
"##;
