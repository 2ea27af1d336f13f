use crate::models::{round_calories, DaySummary, Entry, EntryKind};

pub fn render_index(summary: &DaySummary) -> String {
    let date = summary.date.to_string();
    let values = [
        ("DATE", date.clone()),
        ("INTAKE", summary.totals.intake.to_string()),
        ("BURN", summary.totals.burn.to_string()),
        ("NET", summary.totals.net.to_string()),
        ("MEAL_COUNT", item_count(summary.meal_count)),
        ("WORKOUT_COUNT", item_count(summary.workout_count)),
        ("MEAL_ITEMS", render_items(&date, EntryKind::Meal, &summary.meals)),
        (
            "WORKOUT_ITEMS",
            render_items(&date, EntryKind::Workout, &summary.workouts),
        ),
    ];
    fill_template(INDEX_HTML, &values)
}

/// Single pass over the template: substituted text is never scanned for placeholders.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn item_count(count: usize) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}

fn render_items(date: &str, kind: EntryKind, entries: &[Entry]) -> String {
    if entries.is_empty() {
        return r#"<li class="empty">Nothing logged yet.</li>"#.to_string();
    }

    let suffix = match kind {
        EntryKind::Meal => "kcal",
        EntryKind::Workout => "kcal burned",
    };

    entries
        .iter()
        .map(|entry| {
            format!(
                r#"<li class="item">
          <div class="meta">
            <div class="name">{name}</div>
            <div class="cal">{calories} {suffix}</div>
          </div>
          <form method="post" action="/days/{date}/entries/{kind}/{id}/delete">
            <button class="icon-btn danger" type="submit">Delete</button>
          </form>
        </li>"#,
                name = escape_html(&entry.name),
                calories = round_calories(entry.calories),
                kind = kind.path_segment(),
                id = urlencoding::encode(&entry.id),
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ")
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Calorie Counter</title>
  <style>
    :root {
      --bg-1: #eef6ee;
      --bg-2: #c9e7d0;
      --ink: #22312a;
      --accent: #e4572e;
      --accent-2: #2e6f5e;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(46, 111, 94, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f4fbf4 60%, #fbfdf9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(920px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: end;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0;
      font-size: 1.3rem;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5c6b63;
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
      border: 1px solid rgba(46, 111, 94, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7d8a83;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.net {
      color: var(--accent);
    }

    .toolbar {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
    }

    .columns {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
      gap: 20px;
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 20px;
      border: 1px solid rgba(46, 111, 94, 0.08);
      display: grid;
      gap: 14px;
      align-content: start;
    }

    .card-header {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
    }

    .count {
      color: #7d8a83;
      font-size: 0.9rem;
    }

    .entry-form {
      display: grid;
      grid-template-columns: 1fr 110px auto;
      gap: 8px;
    }

    input {
      border: 1px solid rgba(46, 111, 94, 0.2);
      border-radius: 12px;
      padding: 10px 12px;
      font-size: 1rem;
      font-family: inherit;
    }

    button,
    .button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      text-decoration: none;
      display: inline-flex;
      align-items: center;
    }

    button.danger,
    .danger {
      background: var(--accent);
    }

    .icon-btn {
      padding: 6px 12px;
      font-size: 0.85rem;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    .item {
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 10px 12px;
      border-radius: 12px;
      background: rgba(46, 111, 94, 0.05);
    }

    .item .name {
      font-weight: 600;
    }

    .item .cal,
    .empty {
      color: #6b7a72;
      font-size: 0.9rem;
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
      .entry-form {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Calorie Counter</h1>
        <p class="subtitle">Log meals and workouts for any day.</p>
      </div>
      <form id="date-form" method="get" action="/">
        <input id="date" type="date" name="date" value="{{DATE}}" required />
      </form>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Intake</span>
        <span id="total-intake" class="value">{{INTAKE}}</span>
      </div>
      <div class="stat">
        <span class="label">Burned</span>
        <span id="total-burn" class="value">{{BURN}}</span>
      </div>
      <div class="stat">
        <span class="label">Net</span>
        <span id="net-calories" class="value net">{{NET}}</span>
      </div>
    </section>

    <section class="toolbar">
      <a class="button" id="download-btn" href="/days/{{DATE}}/export.csv">Download CSV</a>
      <form method="post" action="/days/{{DATE}}/clear">
        <button class="danger" id="clear-day-btn" type="submit">Clear day</button>
      </form>
    </section>

    <section class="columns">
      <div class="card">
        <div class="card-header">
          <h2>Meals</h2>
          <span class="count" id="meal-count">{{MEAL_COUNT}}</span>
        </div>
        <form class="entry-form" id="meal-form" method="post" action="/days/{{DATE}}/entries/meals">
          <input name="name" placeholder="Meal" required autofocus />
          <input name="calories" type="number" min="0" step="any" placeholder="kcal" required />
          <button type="submit">Add</button>
        </form>
        <ul id="meal-list">
        {{MEAL_ITEMS}}
        </ul>
      </div>

      <div class="card">
        <div class="card-header">
          <h2>Workouts</h2>
          <span class="count" id="workout-count">{{WORKOUT_COUNT}}</span>
        </div>
        <form class="entry-form" id="workout-form" method="post" action="/days/{{DATE}}/entries/workouts">
          <input name="name" placeholder="Workout" required />
          <input name="calories" type="number" min="0" step="any" placeholder="kcal" required />
          <button type="submit">Add</button>
        </form>
        <ul id="workout-list">
        {{WORKOUT_ITEMS}}
        </ul>
      </div>
    </section>
  </main>

  <script>
    const dateForm = document.getElementById('date-form');
    document.getElementById('date').addEventListener('change', () => dateForm.submit());
  </script>
</body>
</html>
"#;
