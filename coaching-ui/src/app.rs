use crate::bridge::{self, Page};
use coaching_core::list::ListView;
use coaching_core::view::{LOGOUT_LABEL, TOAST_DURATION};
use coaching_core::{ApplicationFeed, ApplicationId, CoachingView, SessionGate, ViewHost};
use futures::StreamExt;
use leptos::leptos_dom::helpers::TimeoutHandle;
use leptos::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;

/// Keeps the list live after mount. The feed's first snapshot repeats the
/// mount load, so it is skipped.
async fn follow_applications(page: &Page) {
    let Some(Some(identity)) = page
        .host()
        .update(|v| v.session().map(|s| s.identity.clone()))
    else {
        return;
    };
    page.follow(page.api().watch(&identity).skip(1)).await;
}

#[component]
pub fn App() -> impl IntoView {
    let state = create_rw_signal(CoachingView::new());
    let page = store_value(Rc::new(bridge::page(state)));
    let toast_timer = store_value(None::<TimeoutHandle>);
    let gate = create_memo(move |_| state.with(|v| v.gate().clone()));

    create_effect(move |_| {
        if state.with(|v| v.alert().is_some()) {
            if let Some(Some(message)) = state.try_update_untracked(CoachingView::take_alert) {
                bridge::alert(&message);
            }
        }
    });

    spawn_local(async move {
        let page = page.get_value();
        if page.mount().await {
            follow_applications(&page).await;
        }
    });

    let sign_in = move |provider_id: String| {
        spawn_local(async move {
            page.get_value().sign_in(&provider_id).await;
        });
    };

    let sign_out = move || {
        spawn_local(async move {
            page.get_value().sign_out().await;
        });
    };

    let submit = move || {
        spawn_local(async move {
            if !page.get_value().submit().await {
                return;
            }
            let Some(generation) = state.try_with_untracked(CoachingView::toast_generation) else {
                return;
            };
            toast_timer.update_value(|slot| {
                if let Some(previous) = slot.take() {
                    previous.clear();
                }
                *slot = set_timeout_with_handle(
                    move || state.update(|v| v.expire_toast(generation)),
                    TOAST_DURATION,
                )
                .ok();
            });
        });
    };

    let delete = move |id: ApplicationId| {
        spawn_local(async move {
            page.get_value().delete(&id).await;
        });
    };

    move || match gate.get() {
        SessionGate::Resolving => view! { <div class="progress indeterminate"></div> }.into_view(),
        SessionGate::Anonymous => view! {
          <div class="container">
            {move || state.with(CoachingView::login_triggers)
              .into_iter()
              .map(|trigger| {
                let provider_id = trigger.provider_id.clone();
                view! {
                  <div>
                    <button class="login" on:click=move |_| sign_in(provider_id.clone())>
                      {trigger.label}
                    </button>
                  </div>
                }
              })
              .collect_view()}
          </div>
        }
        .into_view(),
        SessionGate::Authenticated(session) => view! {
          <div class="container">
            <div class="identity">
              {session.avatar_url.map(|src| view! { <img class="avatar" src=src alt=""/> })}
              <span>{session.identity}</span>
              <button class="logout" on:click=move |_| sign_out()>{LOGOUT_LABEL}</button>
            </div>

            <div class="form">
              <label>{move || state.with(|v| v.form_view().label)}</label>
              <textarea
                placeholder=move || state.with(|v| v.form_view().placeholder)
                prop:value=move || state.with(|v| v.form_view().draft)
                on:input=move |ev| page.with_value(|p| p.set_draft(event_target_value(&ev)))
              ></textarea>
              <button
                class="submit"
                disabled=move || !state.with(|v| v.form_view().submit_enabled)
                on:click=move |_| submit()
              >
                {move || {
                  let form = state.with(CoachingView::form_view);
                  if form.submitting {
                    view! { <span class="spinner"></span> }.into_view()
                  } else {
                    form.submit_label.into_view()
                  }
                }}
              </button>
            </div>

            {move || match state.with(CoachingView::list_view) {
              ListView::Loading { placeholders } => (0..placeholders)
                .map(|_| view! { <div class="card skeleton"></div> })
                .collect_view(),
              ListView::Empty { message } => view! { <p class="empty">{message}</p> }.into_view(),
              ListView::Unavailable { message } => view! { <p class="empty error">{message}</p> }.into_view(),
              ListView::Populated(cards) => cards
                .into_iter()
                .map(|card| {
                  let id = card.id.clone();
                  view! {
                    <div class="card">
                      <p>{card.description}</p>
                      <span class="tag">{card.status.label()}</span>
                      <button
                        class="delete"
                        disabled=card.deleting
                        on:click=move |_| delete(id.clone())
                      >
                        "Delete"
                      </button>
                    </div>
                  }
                })
                .collect_view(),
            }}

            {move || state.with(CoachingView::toast).map(|message| view! {
              <div class="toast" on:click=move |_| state.update(CoachingView::dismiss_toast)>
                {message}
              </div>
            })}
          </div>
        }
        .into_view(),
    }
}
