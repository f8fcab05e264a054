pub(super) const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub(super) const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub(super) const LOREM_IPSUM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
Donec convallis, metus nec ullamcorper ultrices, eros urna ullamcorper ligula, dignissim \
ultricies est augue at est. Curabitur non porta urna. Phasellus rutrum, sapien eu pretium \
pharetra, velit tellus consectetur elit, eget egestas augue sapien ut justo. Vivamus id eros \
sapien. Nulla non elit tincidunt, laoreet arcu eu, commodo urna. Vivamus tincidunt ligula orci, \
a tempor velit elementum et. Suspendisse eget ex eu nisi porta molestie. Sed eu dui in mi \
sollicitudin vestibulum. Pellentesque in ex cursus, lacinia dolor at, accumsan odio. Nunc \
imperdiet magna fringilla libero ultrices elementum. In a justo sed lectus dapibus lobortis id \
sed dolor. Maecenas et leo dictum, consequat lacus a, vestibulum tellus. Curabitur gravida, \
ligula vel eleifend posuere, urna nibh aliquet nulla, nec malesuada nisi mi quis quam. Quisque \
varius dapibus nisi, quis tempor ligula consectetur ac. Nam ligula augue, finibus maximus \
pretium gravida, vestibulum a purus. Suspendisse facilisis orci ac lectus iaculis, sed aliquam \
orci posuere. Quisque a venenatis tellus. Nam lacus massa, auctor vitae dolor sed, pretium \
pharetra ex. Sed interdum tellus sit amet laoreet pellentesque. Nunc et sem vel leo efficitur \
sodales. Donec blandit sollicitudin tellus, ut facilisis felis gravida at. Pellentesque cursus \
nisl sit amet elit pharetra, vitae laoreet mauris posuere. Nam tincidunt nec diam vitae \
vulputate.";

pub(super) fn lorem_words() -> Vec<&'static str> {
    LOREM_IPSUM.split(' ').collect()
}
