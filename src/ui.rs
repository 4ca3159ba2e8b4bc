/// Inline demo page served on non-API GETs. Presentation glue only; the API
/// surface is `/customers`.
pub const DEMO_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Customer API Demo</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 640px; margin: 2rem auto; padding: 0 1rem; }
  form, section { margin-bottom: 1.5rem; }
  label { display: block; margin: 0.5rem 0 0.25rem; }
  input { width: 100%; padding: 0.4rem; box-sizing: border-box; }
  button { margin-top: 0.75rem; padding: 0.5rem 1rem; }
  pre { background: #f4f4f4; padding: 1rem; overflow-x: auto; }
</style>
</head>
<body>
<h1>Customer API Demo</h1>

<form id="create-form">
  <h2>Create customer</h2>
  <label for="name">Name</label>
  <input id="name" name="name" type="text">
  <label for="email">Email</label>
  <input id="email" name="email" type="email">
  <label for="company">Company</label>
  <input id="company" name="company" type="text">
  <button type="submit">Create</button>
</form>

<section>
  <h2>Existing customers</h2>
  <button id="refresh">Refresh list</button>
  <pre id="output">(nothing loaded yet)</pre>
</section>

<script>
const output = document.getElementById('output');

document.getElementById('create-form').addEventListener('submit', async (ev) => {
  ev.preventDefault();
  const form = new FormData(ev.target);
  const body = Object.fromEntries(form.entries());
  const resp = await fetch('/customers', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
  output.textContent = JSON.stringify(await resp.json(), null, 2);
});

document.getElementById('refresh').addEventListener('click', async () => {
  const resp = await fetch('/customers?limit=50');
  output.textContent = JSON.stringify(await resp.json(), null, 2);
});
</script>
</body>
</html>
"#;
