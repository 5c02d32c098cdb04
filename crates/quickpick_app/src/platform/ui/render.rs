use quickpick_core::{AppViewModel, CardView, ContentState, Vote};

const BAR_WIDTH: usize = 20;

/// Renders the projected view model as plain text lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    match view.content {
        ContentState::Start => {
            lines.push(format!("Quick decision [{}]", view.filter));
            lines.push("Type `start` to get suggestions.".to_string());
        }
        ContentState::Loading => {
            lines.push(format!(
                "Finding {} ideas {} {}%",
                view.filter,
                progress_bar(view.progress),
                view.progress
            ));
        }
        ContentState::Error => {
            let message = view.error_message.as_deref().unwrap_or("Something went wrong");
            lines.push(format!("Error: {message}"));
            lines.push("Type `retry` to try again.".to_string());
        }
        ContentState::Empty => {
            lines.push("No more suggestions.".to_string());
        }
        ContentState::Suggestions => {
            if let Some(card) = &view.card {
                let position = view
                    .position
                    .map(|(at, total)| format!(" ({at}/{total})"))
                    .unwrap_or_default();
                lines.push(format!("{}{}", card_title(card), position));
                lines.extend(card_body(card));
            }
        }
    }
    lines
}

fn card_title(card: &CardView) -> String {
    let star = if card.is_favorited { " *" } else { "" };
    let verdict = match card.vote {
        Some(Vote::Approved) => " -> yes!",
        Some(Vote::Rejected) => " -> nope",
        None => "",
    };
    format!("{}{}{}", card.name, star, verdict)
}

fn card_body(card: &CardView) -> Vec<String> {
    let mut lines = Vec::new();
    if card.flipped {
        if let Some(description) = &card.description {
            lines.push(format!("  {description}"));
        }
        if !card.dietary_tags.is_empty() {
            lines.push(format!("  diet: {}", card.dietary_tags.join(", ")));
        }
        if !card.mood_tags.is_empty() {
            lines.push(format!("  mood: {}", card.mood_tags.join(", ")));
        }
        return lines;
    }

    let mut facts = Vec::new();
    if let Some(cuisine) = &card.cuisine {
        facts.push(cuisine.clone());
    }
    if let Some(prep) = &card.prep_time {
        facts.push(prep.clone());
    }
    if let Some(servings) = card.servings {
        facts.push(format!("serves {servings}"));
    }
    if let Some(level) = card.difficulty {
        facts.push(format!("difficulty {level}/5"));
    }
    if !facts.is_empty() {
        lines.push(format!("  {}", facts.join(" | ")));
    }
    if card.drag_offset != 0.0 {
        lines.push(format!("  dragging {:+.0}px", card.drag_offset));
    }
    lines
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}
