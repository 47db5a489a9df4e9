//! Sample rows for seeding a template store.

use serde_json::{json, Value};

/// Table holding curated workflow templates.
pub const TEMPLATES_TABLE: &str = "templates";

/// Table holding analyzed workflows.
pub const ANALYSES_TABLE: &str = "openworksheet_enhanced";

/// Sample rows for the templates table.
pub fn sample_templates() -> Vec<Value> {
    vec![
        json!({
            "template_id": "slack_notification_basic",
            "name": "Slack Notification Workflow",
            "description": "Simple workflow to send notifications to Slack channels",
            "author_name": "John Doe",
            "author_username": "johndoe",
            "author_url": "https://n8n.io/user/johndoe",
            "template_url": "https://n8n.io/workflows/1234",
            "complexity": "simple",
            "target_audience": ["marketers", "developers"],
            "max_setup_minutes": 15,
            "required_services": ["slack"],
            "node_count": 3,
            "trigger_type": "Webhook",
            "execution_frequency": "On-demand",
            "data_source": "External API",
            "data_destination": "Slack Channel",
            "tags": ["slack", "notification", "webhook"],
            "search_keywords": "slack notification webhook api automation",
            "category": "communication",
            "node_types": ["n8n-nodes-base.webhook", "n8n-nodes-base.slack"],
            "connection_count": 2,
            "is_active": true,
            "view_count": 150,
            "usage_count": 25,
            "rating": 4.2
        }),
        json!({
            "template_id": "ai_content_generator",
            "name": "AI Content Generator",
            "description": "Advanced workflow using OpenAI to generate content and post to social media",
            "author_name": "Jane Smith",
            "author_username": "janesmith",
            "author_url": "https://n8n.io/user/janesmith",
            "template_url": "https://n8n.io/workflows/5678",
            "complexity": "advanced",
            "target_audience": ["marketers"],
            "max_setup_minutes": 60,
            "required_services": ["openai", "twitter", "slack"],
            "node_count": 8,
            "trigger_type": "Schedule Trigger",
            "execution_frequency": "Daily",
            "data_source": "OpenAI API",
            "data_destination": "Social Media Platforms",
            "tags": ["ai", "content-generation", "social-media", "openai"],
            "search_keywords": "ai content generation openai gpt social media automation",
            "category": "ai-automation",
            "node_types": [
                "@n8n/n8n-nodes-langchain.lmChatOpenAi",
                "n8n-nodes-base.twitter",
                "n8n-nodes-base.slack"
            ],
            "connection_count": 7,
            "is_active": true,
            "view_count": 300,
            "usage_count": 45,
            "rating": 4.7
        }),
        json!({
            "template_id": "data_sync_etl",
            "name": "Data Sync ETL Pipeline",
            "description": "Extract, Transform, Load pipeline for syncing data between systems",
            "author_name": "Mike Johnson",
            "author_username": "mikej",
            "author_url": "https://n8n.io/user/mikej",
            "template_url": "https://n8n.io/workflows/9012",
            "complexity": "intermediate",
            "target_audience": ["developers", "analysts"],
            "max_setup_minutes": 30,
            "required_services": ["google-sheets", "postgresql"],
            "node_count": 6,
            "trigger_type": "Schedule Trigger",
            "execution_frequency": "Hourly",
            "data_source": "Google Sheets",
            "data_destination": "PostgreSQL Database",
            "tags": ["etl", "data-sync", "database", "google-sheets"],
            "search_keywords": "etl data sync database postgresql google sheets automation",
            "category": "data-processing",
            "node_types": [
                "n8n-nodes-base.googleSheets",
                "n8n-nodes-base.postgres",
                "n8n-nodes-base.splitInBatches"
            ],
            "connection_count": 5,
            "is_active": true,
            "view_count": 200,
            "usage_count": 30,
            "rating": 4.0
        }),
    ]
}

/// Sample rows for the analyzed-workflows table.
pub fn sample_analyses() -> Vec<Value> {
    vec![
        json!({
            "name": "Slack Marketing Automation",
            "description": "Automated Slack notifications for marketing campaigns",
            "url": "https://n8n.io/workflows/slack-marketing",
            "score": 8,
            "folder": "Social Media Automation",
            "status": "new",
            "analyzed_features": ["slack-integration", "notification-automation"],
            "node_types_found": ["n8n-nodes-base.slack", "n8n-nodes-base.webhook"],
            "complexity_analysis": "simple",
            "setup_time_estimate": 15,
            "target_audience": ["marketers"],
            "required_services": ["slack"]
        }),
        json!({
            "name": "AI Content Creator",
            "description": "AI-powered content creation using OpenAI GPT",
            "url": "https://n8n.io/workflows/ai-content",
            "score": 9,
            "folder": "AI & Content Generation",
            "status": "analyzed",
            "analyzed_features": ["ai-integration", "content-generation"],
            "node_types_found": [
                "@n8n/n8n-nodes-langchain.lmChatOpenAi",
                "n8n-nodes-base.httpRequest"
            ],
            "complexity_analysis": "advanced",
            "setup_time_estimate": 45,
            "target_audience": ["marketers"],
            "required_services": ["openai"]
        }),
    ]
}
