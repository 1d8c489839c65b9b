use axum::{extract::State, response::Html};

use crate::state::AppState;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Pair Code Bot</title>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            padding: 20px;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            background: white;
            padding: 40px;
            border-radius: 20px;
            box-shadow: 0 20px 40px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 40px;
            background: linear-gradient(135deg, #4CAF50, #45a049);
            color: white;
            padding: 30px;
            border-radius: 15px;
        }
        .stats {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 20px;
            margin: 30px 0;
        }
        .stat-card {
            background: white;
            padding: 25px;
            border-radius: 15px;
            text-align: center;
            box-shadow: 0 5px 15px rgba(0,0,0,0.1);
            border-left: 5px solid #4CAF50;
        }
        .stat-card h3 { color: #666; font-size: 14px; margin-bottom: 10px; }
        .stat-card h2 { color: #333; font-size: 32px; }
        .command {
            background: #f8f9fa;
            padding: 15px;
            border-radius: 10px;
            margin: 10px 0;
            border-left: 4px solid #4CAF50;
        }
        .features { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 20px; margin: 30px 0; }
        .feature-card { background: #f8f9fa; padding: 20px; border-radius: 10px; }
        .code-example { background: #2d3748; color: #68d391; padding: 15px; border-radius: 8px; font-family: monospace; margin: 10px 0; }
    </style>
</head>
<body>
    <div class="container">
"#;

const PAGE_TAIL: &str = r#"        <h2>🛠️ Available Commands</h2>
        <div class="command"><strong>!pair</strong> - Generate new pair code</div>
        <div class="command"><strong>!mycode</strong> - Show your current active code</div>
        <div class="command"><strong>!help</strong> - Show detailed help menu</div>
        <div class="command"><strong>!status</strong> - Check bot status and statistics</div>
        <div class="command"><strong>!users</strong> - Admin: View user statistics</div>
        <div class="command"><strong>!stats</strong> - Admin: Detailed bot statistics</div>

        <h2>🔢 Code Examples</h2>
        <div class="code-example">A1B2C3D4 - alphanumeric pair code</div>
        <div class="code-example">X8Y9Z0W1 - Unique for each user</div>
        <div class="code-example">M5N6P7Q8 - Expires automatically</div>

        <div style="margin-top: 40px; padding: 20px; background: #e8f5e8; border-radius: 10px; text-align: center;">
            <h3>🌐 Multiple Users Supported</h3>
            <p>Unlimited users can generate codes simultaneously. Perfect for teams, applications, and services.</p>
        </div>
    </div>
</body>
</html>
"#;

/// Renders the live dashboard with aggregate counts.
#[axum::debug_handler]
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.store.read().unwrap().snapshot();
    let uptime_minutes = state.uptime().as_secs() / 60;
    let length = state.config.code_length;
    let expiry = state.config.code_expiry_hours;

    let body = format!(
        r#"        <div class="header">
            <h1>🤖 Pair Code Bot</h1>
            <p>Multi-user bot for generating unique {length}-character pair codes</p>
        </div>

        <div class="stats">
            <div class="stat-card">
                <h3>👥 Total Users</h3>
                <h2>{users}</h2>
            </div>
            <div class="stat-card">
                <h3>🔑 Active Codes</h3>
                <h2>{codes}</h2>
            </div>
            <div class="stat-card">
                <h3>📊 Total Usage</h3>
                <h2>{usage}</h2>
            </div>
            <div class="stat-card">
                <h3>🕐 Uptime</h3>
                <h2>{uptime_minutes}m</h2>
            </div>
        </div>

        <h2>🚀 How to Use</h2>
        <div class="features">
            <div class="feature-card">
                <h3>1. Save Bot Contact</h3>
                <p>Add the bot to your contacts</p>
            </div>
            <div class="feature-card">
                <h3>2. Send Command</h3>
                <p>Message <strong>!pair</strong> to get your code</p>
            </div>
            <div class="feature-card">
                <h3>3. Use Your Code</h3>
                <p>{length}-character code valid for {expiry} hours</p>
            </div>
        </div>
"#,
        users = snapshot.user_count,
        codes = snapshot.active_code_count,
        usage = snapshot.total_events,
    );

    Html(format!("{PAGE_HEAD}{body}{PAGE_TAIL}"))
}
