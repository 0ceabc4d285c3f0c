//! The single-page web UI.
//!
//! Input bounds are substituted from [`crate::config`] so the page and the
//! API validation never disagree.

use crate::config::{CFG_SCALE, DURATION_S, InputRange, STEPS};

const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Stable Audio Generator</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
  .row { display: flex; gap: 2rem; flex-wrap: wrap; }
  .col { flex: 1; min-width: 300px; }
  label { display: block; margin-top: 1rem; font-weight: 600; }
  textarea, input[type=range] { width: 100%; }
  output { font-weight: normal; margin-left: .5rem; }
  .status { padding: .5rem; background: #f3f3f3; border-radius: 4px; }
  button { margin-top: 1rem; padding: .6rem 1.2rem; }
  #examples li { cursor: pointer; margin: .4rem 0; color: #245; }
</style>
</head>
<body>
<h1>🎵 Stable Audio Generator</h1>
<p>Fast audio generation using Stable Audio Open 1.0. For best speed: use 15s duration and 50 steps.</p>

<label>Model Status</label>
<div id="model-status" class="status">⏳ Starting model loading...</div>

<div class="row">
  <div class="col">
    <label for="prompt">Prompt</label>
    <textarea id="prompt" rows="3" placeholder="Enter your text prompt here"></textarea>

    <label for="duration">Duration in Seconds <output id="duration-value"></output></label>
    <input id="duration" type="range" min="{{DURATION_MIN}}" max="{{DURATION_MAX}}" step="{{DURATION_STEP}}" value="{{DURATION_DEFAULT}}">

    <label for="steps">Number of Diffusion Steps <output id="steps-value"></output></label>
    <input id="steps" type="range" min="{{STEPS_MIN}}" max="{{STEPS_MAX}}" step="{{STEPS_STEP}}" value="{{STEPS_DEFAULT}}">

    <label for="cfg">CFG Scale <output id="cfg-value"></output></label>
    <input id="cfg" type="range" min="{{CFG_MIN}}" max="{{CFG_MAX}}" step="{{CFG_STEP}}" value="{{CFG_DEFAULT}}">

    <button id="generate">🎵 Generate Audio</button>
  </div>
  <div class="col">
    <label>Generated Audio</label>
    <audio id="audio" controls></audio>
    <label>Status</label>
    <div id="result" class="status"></div>
  </div>
</div>

<h2>Examples</h2>
<ul id="examples"></ul>

<script>
const $ = (id) => document.getElementById(id);

for (const id of ["duration", "steps", "cfg"]) {
  const show = () => { $(id + "-value").textContent = $(id).value; };
  $(id).addEventListener("input", show);
  show();
}

function setInputs(example) {
  $("prompt").value = example.prompt;
  $("duration").value = example.duration;
  $("steps").value = example.steps;
  $("cfg").value = example.cfg_scale;
  for (const id of ["duration", "steps", "cfg"]) {
    $(id).dispatchEvent(new Event("input"));
  }
}

async function loadStatus() {
  try {
    const res = await fetch("/api/status");
    const body = await res.json();
    $("model-status").textContent = body.message;
  } catch (err) {
    $("model-status").textContent = "❌ " + err;
  }
}

async function loadExamples() {
  const res = await fetch("/api/examples");
  const examples = await res.json();
  for (const example of examples) {
    const li = document.createElement("li");
    li.textContent = `${example.prompt} (${example.duration}s, ${example.steps} steps, cfg ${example.cfg_scale})`;
    li.addEventListener("click", () => setInputs(example));
    $("examples").appendChild(li);
  }
}

$("generate").addEventListener("click", async () => {
  $("generate").disabled = true;
  $("result").textContent = "Generating...";
  try {
    const res = await fetch("/api/generate", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({
        prompt: $("prompt").value,
        duration: Number($("duration").value),
        steps: Number($("steps").value),
        cfg_scale: Number($("cfg").value),
      }),
    });
    const body = await res.json();
    $("result").textContent = body.message ?? body.error;
    if (body.audio) {
      $("audio").src = body.audio;
    } else {
      $("audio").removeAttribute("src");
    }
  } catch (err) {
    $("result").textContent = "❌ " + err;
  } finally {
    $("generate").disabled = false;
  }
});

loadStatus();
loadExamples();
</script>
</body>
</html>
"#;

fn substitute<T: ToString + Copy>(html: String, key: &str, range: &InputRange<T>) -> String {
    html.replace(&format!("{{{{{key}_MIN}}}}"), &range.min.to_string())
        .replace(&format!("{{{{{key}_MAX}}}}"), &range.max.to_string())
        .replace(&format!("{{{{{key}_STEP}}}}"), &range.step.to_string())
        .replace(&format!("{{{{{key}_DEFAULT}}}}"), &range.default.to_string())
}

pub fn render_index() -> String {
    let html = TEMPLATE.to_string();
    let html = substitute(html, "DURATION", &DURATION_S);
    let html = substitute(html, "STEPS", &STEPS);
    substitute(html, "CFG", &CFG_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_placeholders_filled() {
        let html = render_index();
        assert!(!html.contains("{{"), "unfilled placeholder");
        assert!(html.contains(r#"id="duration" type="range" min="5" max="47" step="1" value="15""#));
        assert!(html.contains(r#"min="20" max="200" step="5" value="50""#));
        assert!(html.contains(r#"min="1" max="15" step="0.1" value="7""#));
    }
}
