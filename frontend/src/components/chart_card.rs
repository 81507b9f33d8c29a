use intellidash::chart::{self, ChartSpec, SeriesShape, VIEW_HEIGHT, VIEW_WIDTH};
use leptos::prelude::*;

const PALETTE: [&str; 6] = ["#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4"];

fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn path_data(points: &[chart::Point]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}{:.1} {:.1}", if i == 0 { "M" } else { " L" }, p.x, p.y))
        .collect()
}

/// A titled card with an inline SVG line or bar chart.
#[component]
pub fn ChartCard(spec: ChartSpec) -> impl IntoView {
    let layout = chart::layout(&spec, VIEW_WIDTH, VIEW_HEIGHT);
    let view_box = format!("0 0 {} {}", layout.width, layout.height);
    let baseline = layout.baseline;
    let right = layout.width - chart::PADDING;

    let series = layout
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| match &series.shape {
            SeriesShape::Line(runs) => runs
                .iter()
                .map(|run| {
                    view! {
                        <path d=path_data(run) fill="none" stroke=color(i) stroke-width="2" />
                    }
                    .into_any()
                })
                .collect::<Vec<_>>(),
            SeriesShape::Bars(bars) => bars
                .iter()
                .map(|bar| {
                    view! {
                        <rect x=bar.x y=bar.y width=bar.width height=bar.height fill=color(i) />
                    }
                    .into_any()
                })
                .collect::<Vec<_>>(),
        })
        .collect::<Vec<_>>();

    let labels = layout
        .x_labels
        .iter()
        .map(|label| {
            view! {
                <text x=label.x y=baseline + 16.0 text-anchor="middle" font-size="11" fill="currentColor">
                    {label.text.clone()}
                </text>
            }
        })
        .collect::<Vec<_>>();

    let legend = layout
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            view! {
                <span class="flex items-center gap-1 text-xs">
                    <span class="inline-block w-3 h-3 rounded-sm" style=format!("background:{}", color(i))></span>
                    {series.label.clone()}
                </span>
            }
        })
        .collect::<Vec<_>>();

    let empty = spec.is_empty();

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">{spec.title.clone()}</h3>
                {if empty {
                    view! { <p class="text-base-content/50">"No data"</p> }.into_any()
                } else {
                    view! {
                        <svg viewBox=view_box class="w-full h-auto" role="img">
                            <line x1=chart::PADDING y1=baseline x2=right y2=baseline stroke="currentColor" stroke-opacity="0.3" />
                            {series}
                            {labels}
                        </svg>
                        <div class="flex flex-wrap gap-3">{legend}</div>
                    }
                    .into_any()
                }}
            </div>
        </div>
    }
}
