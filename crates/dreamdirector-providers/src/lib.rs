//! Generative provider adapters.
//!
//! Anti-corruption layer over the Google Generative Language REST API. Each
//! adapter translates between the provider ports in `dreamdirector_core`
//! and one model family: Gemini for text, Imagen for stills, Veo for video
//! and Lyria for music.

use std::sync::Arc;

use dreamdirector_core::provider::{ProviderError, ProviderSet};

mod client;
mod config;
mod gemini;
mod imagen;
mod lyria;
mod veo;

pub use client::GenAiClient;
pub use config::{DEFAULT_BASE_URL, ProviderConfig};
pub use gemini::GeminiTextGenerator;
pub use imagen::ImagenImageGenerator;
pub use lyria::LyriaMusicGenerator;
pub use veo::VeoVideoGenerator;

/// Wires all four adapters onto one shared HTTP client.
///
/// # Errors
///
/// Returns `ProviderError::Network` if the HTTP client cannot be built.
pub fn google_provider_set(config: &ProviderConfig) -> Result<ProviderSet, ProviderError> {
    let client = GenAiClient::new(config)?;
    Ok(ProviderSet {
        text: Arc::new(GeminiTextGenerator::new(client.clone(), &config.text_model)),
        image: Arc::new(ImagenImageGenerator::new(client.clone(), &config.image_model)),
        video: Arc::new(VeoVideoGenerator::new(
            client.clone(),
            &config.video_model,
            config.video_poll_interval,
            config.video_max_polls,
        )),
        music: Arc::new(LyriaMusicGenerator::new(client, &config.music_model)),
    })
}
