//! Idea capture service.

use crate::model::idea::Idea;
use crate::repo::idea_repo::IdeaRepository;
use crate::service::ServiceResult;
use crate::sync::progress::{emit, ProgressEvent, ProgressLog};
use log::info;

/// Idea capture over an idea repository.
pub struct IdeaService<R, L> {
    repo: R,
    progress: L,
}

impl<R: IdeaRepository, L: ProgressLog> IdeaService<R, L> {
    /// Creates a service using the provided repository and progress sink.
    pub fn new(repo: R, progress: L) -> Self {
        Self { repo, progress }
    }

    /// Stores a new idea; a blank title is rejected.
    pub fn add_idea(&self, title: &str, description: &str, trigger: &str) -> ServiceResult<Idea> {
        let idea = Idea::new(title.trim(), description.trim(), trigger);
        idea.validate()?;
        self.repo.create_idea(&idea)?;

        info!("event=idea_add module=service status=ok idea_id={}", idea.id);
        emit(&self.progress, ProgressEvent::IdeaStored { title: &idea.title });
        Ok(idea)
    }

    /// Lists ideas in creation order.
    pub fn list_ideas(&self) -> ServiceResult<Vec<Idea>> {
        Ok(self.repo.list_ideas()?)
    }
}
