//! Embedded HTML/CSS/JS frontend for the chatdash web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies. The page holds
//! no session state of its own: it renders what the JSON API returns.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>chatdash</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 { font-size: 24px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.badge {
  display: inline-flex;
  align-items: center;
  padding: 4px 10px;
  border-radius: 12px;
  font-size: 12px;
  font-weight: 500;
  background: var(--surface);
  border: 1px solid var(--border);
}
.badge.ok { border-color: var(--green); color: var(--green); }
.badge.err { border-color: var(--red); color: var(--red); }

nav {
  display: flex;
  gap: 4px;
  margin-bottom: 24px;
  background: var(--surface);
  border-radius: var(--radius);
  padding: 4px;
  border: 1px solid var(--border);
}
nav button {
  flex: 1;
  padding: 8px 16px;
  border: none;
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  font-size: 13px;
  cursor: pointer;
}
nav button.active { background: var(--accent); color: #fff; }

.layout { display: grid; grid-template-columns: 2fr 1fr; gap: 16px; }
.layout.collapsed { grid-template-columns: 1fr; }
.layout.collapsed #analytics { display: none; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
.card h3 { font-size: 13px; color: var(--text-muted); margin: 12px 0 8px; }

.panel { display: none; }
.panel.active { display: block; }

/* Chat */
.messages { height: 420px; overflow-y: auto; padding-right: 4px; }
.message { margin-bottom: 12px; max-width: 80%; }
.message.user { margin-left: auto; text-align: right; }
.message-content {
  display: inline-block;
  padding: 8px 12px;
  border-radius: 12px;
  background: var(--bg);
  border: 1px solid var(--border);
  text-align: left;
}
.message.user .message-content { background: var(--accent); color: #fff; border-color: var(--accent); }
.message-content img { max-width: 240px; display: block; margin-top: 6px; border-radius: 6px; }
.message-info { font-size: 11px; color: var(--text-muted); margin-top: 4px; }
.intent-badge {
  font-family: var(--mono);
  background: var(--border);
  border-radius: 4px;
  padding: 1px 6px;
  margin-right: 6px;
}
.entity-highlight { background: var(--purple); color: #fff; border-radius: 3px; padding: 0 3px; }
.reply-buttons { margin-top: 6px; display: flex; gap: 6px; flex-wrap: wrap; }

.composer { display: flex; gap: 8px; margin-top: 12px; }
.composer input, .training-form input, .training-form select {
  flex: 1;
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  padding: 8px 10px;
  font-size: 13px;
}

.btn {
  padding: 8px 16px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--surface);
  color: var(--text);
  font-size: 13px;
  cursor: pointer;
}
.btn.primary { background: var(--accent); color: #fff; border-color: var(--accent); }
.btn:disabled { opacity: 0.5; cursor: not-allowed; }

.training-form { display: flex; flex-direction: column; gap: 8px; }
.training-form .row { display: flex; gap: 8px; }
.examples { list-style: none; font-size: 13px; }
.examples li { padding: 4px 0; border-bottom: 1px solid var(--border); }

/* Analytics */
.stats-grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 8px; margin-bottom: 12px; }
.stat-card { background: var(--bg); border: 1px solid var(--border); border-radius: var(--radius); padding: 12px; text-align: center; }
.stat-card .value { font-size: 22px; font-weight: 700; font-family: var(--mono); color: var(--accent); }
.stat-card .label { font-size: 11px; color: var(--text-muted); text-transform: uppercase; }

.bars .row { display: flex; align-items: center; gap: 8px; margin-bottom: 4px; font-size: 12px; }
.bars .name { flex: 0 0 110px; overflow: hidden; text-overflow: ellipsis; font-family: var(--mono); }
.bars .track { flex: 1; background: var(--bg); border-radius: 3px; height: 12px; }
.bars .fill { background: var(--accent); height: 100%; border-radius: 3px; }
.bars .val { flex: 0 0 48px; text-align: right; color: var(--text-muted); }

.dist-bar { display: flex; height: 22px; border-radius: 6px; overflow: hidden; margin-bottom: 6px; }
.dist-bar .seg { min-width: 4px; }
.dist-legend { font-size: 11px; color: var(--text-muted); display: flex; flex-wrap: wrap; gap: 8px; }

table { width: 100%; border-collapse: collapse; font-size: 12px; }
th, td { text-align: left; padding: 4px 8px; border-bottom: 1px solid var(--border); }
td.num, th.num { text-align: right; font-family: var(--mono); }

.empty { color: var(--text-muted); font-size: 12px; padding: 8px 0; }

.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  padding: 12px 20px;
  border-radius: var(--radius);
  background: var(--green);
  color: #fff;
  font-size: 13px;
  transform: translateY(80px);
  opacity: 0;
  transition: all 0.3s;
}
.toast.show { transform: translateY(0); opacity: 1; }
.toast.error { background: var(--red); }
.toast.warn { background: var(--yellow); }

@media (max-width: 900px) { .layout { grid-template-columns: 1fr; } }
</style>
</head>
<body>
<div class="app">

  <header>
    <div>
      <h1><span class="logo">chatdash</span></h1>
      <div class="subtitle" id="sender"></div>
    </div>
    <span class="badge err" id="connectivity">❌ Desconectado</span>
  </header>

  <nav id="nav">
    <button class="active" data-panel="chat">Chat</button>
    <button data-panel="training">Entrenamiento</button>
    <button id="toggle-analytics">Analytics</button>
  </nav>

  <div class="layout" id="layout">
    <div>
      <div class="panel active" id="panel-chat">
        <div class="card">
          <div class="messages" id="messages"></div>
          <form class="composer" id="composer">
            <input id="message-input" autocomplete="off" placeholder="Escribe tu mensaje...">
            <button class="btn primary" id="send-button" type="submit">➤</button>
          </form>
        </div>
      </div>

      <div class="panel" id="panel-training">
        <div class="card">
          <h2>Entrenamiento</h2>
          <div class="training-form">
            <div class="row">
              <select id="intent-select"><option value="">Seleccionar intent...</option></select>
              <button class="btn" id="reload-intents">↻</button>
            </div>
            <div class="row">
              <input id="new-intent" placeholder="Nuevo intent">
              <button class="btn" id="create-intent">Crear</button>
            </div>
            <div class="row">
              <input id="example-input" placeholder="Ejemplo de entrenamiento">
              <button class="btn primary" id="add-example">Agregar</button>
            </div>
            <button class="btn" id="train-button">Entrenar modelo</button>
          </div>
          <h3>Ejemplos</h3>
          <ul class="examples" id="examples"></ul>
        </div>
      </div>
    </div>

    <div id="analytics">
      <div class="card">
        <h2>Analytics</h2>
        <div class="stats-grid">
          <div class="stat-card"><div class="value" id="stat-messages">0</div><div class="label">Mensajes</div></div>
          <div class="stat-card"><div class="value" id="stat-intents">0</div><div class="label">Intents</div></div>
          <div class="stat-card"><div class="value" id="stat-entities">0</div><div class="label">Entidades</div></div>
          <div class="stat-card"><div class="value" id="stat-confidence"></div><div class="label">Confianza</div></div>
        </div>
        <h3>Intents (%)</h3>
        <div class="bars" id="intent-chart"></div>
        <h3>Entidades</h3>
        <div class="dist-bar" id="entity-chart"></div>
        <div class="dist-legend" id="entity-legend"></div>
        <h3>Distribución</h3>
        <table>
          <thead><tr><th>Intent</th><th class="num">Mensajes</th></tr></thead>
          <tbody id="distribution"></tbody>
        </table>
      </div>
    </div>
  </div>
</div>

<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
const PALETTE = ['#58a6ff', '#3fb950', '#bc8cff', '#d29922', '#39d2c0', '#f85149'];
let dashboardRevision = -1;

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || res.status);
  return data;
}

function toast(msg, kind) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (kind ? ' ' + kind : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function esc(s) {
  if (s === undefined || s === null) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------
function applyPanels(p) {
  document.querySelectorAll('nav button[data-panel]').forEach(b =>
    b.classList.toggle('active', b.dataset.panel === p.active));
  document.querySelectorAll('.panel').forEach(el =>
    el.classList.toggle('active', el.id === 'panel-' + p.active));
  document.getElementById('layout').classList.toggle('collapsed', p.analytics_collapsed);
  if (p.active === 'training') loadIntents();
}

document.getElementById('nav').addEventListener('click', async e => {
  if (e.target.tagName !== 'BUTTON') return;
  try {
    if (e.target.id === 'toggle-analytics') {
      applyPanels(await api('POST', '/api/panel/analytics/toggle'));
    } else if (e.target.dataset.panel) {
      applyPanels(await api('POST', '/api/panel', { panel: e.target.dataset.panel }));
    }
  } catch (err) {
    toast('Error: ' + err.message, 'error');
  }
});

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------
function renderSegments(segments) {
  return segments.map(s => s.entity
    ? `<span class="entity-highlight" title="${esc(s.entity)}">${esc(s.text)}</span>`
    : esc(s.text)).join('');
}

function addMessage(html, isUser, annotation) {
  const div = document.createElement('div');
  div.className = 'message ' + (isUser ? 'user' : 'bot');
  let inner = `<div class="message-content">${html}</div>`;
  if (annotation) {
    inner += `<div class="message-info"><span class="intent-badge">${esc(annotation.intent)}</span>${esc(annotation.confidence_label)}</div>`;
  }
  div.innerHTML = inner;
  const box = document.getElementById('messages');
  box.appendChild(div);
  box.scrollTop = box.scrollHeight;
  return div;
}

function renderReply(reply) {
  let html = esc(reply.text || '');
  if (reply.image) html += `<img src="${esc(reply.image)}" alt="">`;
  if (reply.buttons && reply.buttons.length) {
    html += '<div class="reply-buttons">' + reply.buttons.map(b =>
      `<button class="btn" data-payload="${esc(b.payload)}">${esc(b.title)}</button>`).join('') + '</div>';
  }
  return html;
}

async function sendMessage(text) {
  const input = document.getElementById('message-input');
  const button = document.getElementById('send-button');
  if (!text.trim()) return;
  button.disabled = true;
  input.value = '';
  // Shown before sending so a failed delivery keeps what was typed.
  const pending = addMessage(esc(text.trim()), true);
  try {
    const ex = await api('POST', '/api/chat', { message: text });
    pending.querySelector('.message-content').innerHTML = renderSegments(ex.highlighted);
    if (ex.no_response) {
      addMessage(esc('No hay respuesta del chatbot'), false);
    } else {
      ex.replies.filter(r => r.text || r.image).forEach(r => addMessage(renderReply(r), false, ex.annotation));
    }
    loadDashboard();
  } catch (err) {
    toast(err.message, 'error');
  } finally {
    button.disabled = false;
    input.focus();
  }
}

document.getElementById('composer').addEventListener('submit', e => {
  e.preventDefault();
  sendMessage(document.getElementById('message-input').value);
});

document.getElementById('messages').addEventListener('click', e => {
  if (e.target.dataset.payload) sendMessage(e.target.dataset.payload);
});

async function loadStatus() {
  try {
    const s = await api('GET', '/api/status');
    const el = document.getElementById('connectivity');
    el.textContent = s.label;
    el.className = 'badge ' + (s.connectivity === 'connected' ? 'ok' : 'err');
    document.getElementById('sender').textContent = s.sender_id;
  } catch (err) {
    // Server gone; keep the last indicator.
  }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------
async function loadDashboard() {
  try {
    const d = await api('GET', '/api/dashboard');
    if (d.revision !== dashboardRevision) {
      dashboardRevision = d.revision;
      renderDashboard(d.view);
    }
    applyPanels(d.panels);
  } catch (err) {
    toast('Error: ' + err.message, 'error');
  }
}

function renderDashboard(v) {
  document.getElementById('stat-messages').textContent = v.total_messages;
  document.getElementById('stat-intents').textContent = v.distinct_intents;
  document.getElementById('stat-entities').textContent = v.distinct_entities;
  document.getElementById('stat-confidence').textContent = v.average_confidence_label;

  const ic = v.intent_chart;
  document.getElementById('intent-chart').innerHTML = ic.labels.length === 0
    ? '<div class="empty">Sin datos</div>'
    : ic.labels.map((l, i) => `
      <div class="row">
        <span class="name">${esc(l)}</span>
        <span class="track"><span class="fill" style="display:block;width:${ic.values[i]}%"></span></span>
        <span class="val">${ic.values[i].toFixed(1)}%</span>
      </div>`).join('');

  const ec = v.entity_chart;
  const total = ec.values.reduce((a, b) => a + b, 0);
  document.getElementById('entity-chart').innerHTML = total === 0 ? '' : ec.labels.map((l, i) =>
    `<div class="seg" title="${esc(l)}" style="width:${ec.values[i] / total * 100}%;background:${PALETTE[i % PALETTE.length]}"></div>`).join('');
  document.getElementById('entity-legend').innerHTML = ec.labels.length === 0
    ? '<span class="empty">Sin datos</span>'
    : ec.labels.map((l, i) => `<span style="color:${PALETTE[i % PALETTE.length]}">■ ${esc(l)} (${ec.values[i]})</span>`).join('');

  document.getElementById('distribution').innerHTML = v.distribution.map(r =>
    `<tr><td>${esc(r.intent)}</td><td class="num">${r.count}</td></tr>`).join('');
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------
function renderIntents(intents, selected) {
  const sel = document.getElementById('intent-select');
  const current = selected || sel.value;
  sel.innerHTML = '<option value="">Seleccionar intent...</option>' +
    intents.map(i => `<option value="${esc(i)}">${esc(i)}</option>`).join('');
  sel.value = current;
}

async function loadIntents() {
  try {
    renderIntents((await api('GET', '/api/intents')).intents);
  } catch (err) {
    toast('Error: ' + err.message, 'error');
  }
}

function renderExamples(examples) {
  document.getElementById('examples').innerHTML = examples.map(e => `<li>${esc(e)}</li>`).join('');
}

async function loadExamples(intent) {
  if (!intent) { renderExamples([]); return; }
  try {
    renderExamples((await api('GET', '/api/intents/' + encodeURIComponent(intent) + '/examples')).examples);
  } catch (err) {
    toast('Error: ' + err.message, 'error');
  }
}

document.getElementById('intent-select').addEventListener('change', e => loadExamples(e.target.value));
document.getElementById('reload-intents').addEventListener('click', loadIntents);

document.getElementById('create-intent').addEventListener('click', async () => {
  const input = document.getElementById('new-intent');
  try {
    const r = await api('POST', '/api/intents', { name: input.value });
    renderIntents(r.intents, r.name);
    loadExamples(r.name);
    input.value = '';
    toast(r.message);
  } catch (err) {
    toast(err.message, 'error');
  }
});

document.getElementById('add-example').addEventListener('click', async () => {
  const intent = document.getElementById('intent-select').value;
  const input = document.getElementById('example-input');
  try {
    const r = await api('POST', '/api/examples', { intent, example: input.value });
    toast(r.outcome.message, r.outcome.status === 'done' ? '' : 'warn');
    if (r.examples) renderExamples(r.examples);
    input.value = '';
  } catch (err) {
    toast(err.message, 'error');
  }
});

document.getElementById('train-button').addEventListener('click', async () => {
  if (!confirm('¿Estás seguro de que quieres entrenar el modelo? Esto puede tomar varios minutos.')) return;
  const button = document.getElementById('train-button');
  button.disabled = true;
  try {
    const r = await api('POST', '/api/train');
    if (r.toast) toast(r.toast);
    else toast(r.outcome.message, r.outcome.status === 'failed' ? 'error' : 'warn');
  } catch (err) {
    toast(err.message, 'error');
  } finally {
    button.disabled = false;
  }
});

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
loadStatus();
loadDashboard();
setInterval(loadStatus, 5000);
</script>
</body>
</html>"##;
