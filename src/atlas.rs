use crate::model::MoveList;
use std::path::Path;

/// Sprite container the move list points into. Pixel data never passes
/// through this crate; only the sprite count is needed.
pub trait SpriteAtlas {
    fn load(&mut self, path: &Path) -> bool;
    fn sprite_count(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingSprite {
    pub sequence: usize,
    pub frame: usize,
    pub sprite: i32,
}

/// Direct sprite references that fall outside `atlas`. Pattern references
/// resolve through another sequence and are not checked.
pub fn missing_sprites(table: &MoveList, atlas: &dyn SpriteAtlas) -> Vec<MissingSprite> {
    let count = atlas.sprite_count();
    let mut missing = Vec::new();
    for (sequence, seq) in table.initialized() {
        for (frame, f) in seq.frames.iter().enumerate() {
            if let Some(id) = f.display.sprite.sprite_id() {
                if id < 0 || id as usize >= count {
                    missing.push(MissingSprite {
                        sequence,
                        frame,
                        sprite: id,
                    });
                }
            }
        }
    }
    if !missing.is_empty() {
        log::warn!(
            "{} sprite references beyond an atlas of {} sprites",
            missing.len(),
            count
        );
    }
    missing
}
